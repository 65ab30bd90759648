#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Device identification reported by the version query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VersionInfo {
    pub vendor: String,
    pub product: String,
    pub firmware: String,
    pub protocol: String,
    pub serial_number: String,
}
