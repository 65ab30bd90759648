use log::warn;
use urg_data::{ScanFrame, ScanGeometry, NO_MEASUREMENT};

pub(crate) trait UrgScan {
    fn from_measurements(
        timestamp: u32,
        start_index: u32,
        values: &[u32],
        geometry: &ScanGeometry,
    ) -> ScanFrame;
}

impl UrgScan for ScanFrame {
    /// Place `values` at their absolute indices, starting at `start_index`.
    /// The frame always covers `0..=geometry.max_index`.
    fn from_measurements(
        timestamp: u32,
        start_index: u32,
        values: &[u32],
        geometry: &ScanGeometry,
    ) -> ScanFrame {
        let frame_len = geometry.frame_len();
        let n_leading = (start_index as usize).min(frame_len);

        let mut distances = Vec::with_capacity(frame_len);
        distances.resize(n_leading, NO_MEASUREMENT);
        distances.extend(values.iter().map(|&v| v as i32));
        if distances.len() > frame_len {
            warn!(
                "dropping {} values beyond index {}",
                distances.len() - frame_len,
                geometry.max_index
            );
            distances.truncate(frame_len);
        }
        distances.resize(frame_len, NO_MEASUREMENT);

        ScanFrame {
            distances,
            timestamp: timestamp.into(),
        }
    }
}
