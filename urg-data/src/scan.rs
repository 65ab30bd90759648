#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Value stored for an angular index the device did not report.
pub const NO_MEASUREMENT: i32 = -1;

/// Timestamp carried by a frame whose capture failed.
pub const NO_TIMESTAMP: i64 = -1;

/// Struct to hold one capture of range data.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanFrame {
    /// Distance in mm, indexed by absolute angular index.
    /// `AMAX` is an inclusive index, so a frame holds `AMAX + 1` entries.
    /// Indices outside the requested range hold `NO_MEASUREMENT`.
    pub distances: Vec<i32>,
    /// Device timestamp in ms, or `NO_TIMESTAMP` on failure.
    pub timestamp: i64,
}

impl ScanFrame {
    /// The frame handed out when a capture fails.
    pub fn empty() -> ScanFrame {
        ScanFrame {
            distances: Vec::new(),
            timestamp: NO_TIMESTAMP,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Distance at `index`, or `None` when the device did not report it.
    pub fn distance_at(&self, index: usize) -> Option<u32> {
        match self.distances.get(index) {
            Some(&d) if d >= 0 => Some(d as u32),
            _ => None,
        }
    }
}

impl Default for ScanFrame {
    fn default() -> Self {
        ScanFrame::empty()
    }
}
