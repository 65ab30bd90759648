pub mod parameters;
pub mod scan;
pub mod version_info;

pub use parameters::{ParameterMap, ScanGeometry};
pub use scan::{ScanFrame, NO_MEASUREMENT, NO_TIMESTAMP};
pub use version_info::VersionInfo;
