use std::collections::HashMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const KEY_MODEL: &str = "MODL";
pub const KEY_MIN_DISTANCE: &str = "DMIN";
pub const KEY_MAX_DISTANCE: &str = "DMAX";
pub const KEY_ANGULAR_RESOLUTION: &str = "ARES";
pub const KEY_MIN_INDEX: &str = "AMIN";
pub const KEY_MAX_INDEX: &str = "AMAX";
pub const KEY_FRONT_INDEX: &str = "AFRT";
pub const KEY_ROTATION_SPEED: &str = "SCAN";

/// Raw key/value pairs reported by the parameter query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParameterMap {
    values: HashMap<String, String>,
}

impl ParameterMap {
    pub fn new() -> ParameterMap {
        ParameterMap {
            values: HashMap::new(),
        }
    }

    /// Insert a value, replacing any previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Device model string (`MODL`).
    pub fn model(&self) -> Option<&str> {
        self.get(KEY_MODEL)
    }
}

/// Scan geometry and timing constants of a connected device.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanGeometry {
    /// First measurable angular index (`AMIN`).
    pub min_index: u32,
    /// Last measurable angular index (`AMAX`).
    pub max_index: u32,
    /// Index of the forward direction (`AFRT`).
    pub front_index: u32,
    /// Number of angular steps in one revolution (`ARES`).
    pub angular_resolution: u32,
    /// Motor speed in rpm (`SCAN`).
    pub rotation_rpm: u32,
    /// Minimum measurable distance in mm (`DMIN`).
    pub min_distance: Option<u32>,
    /// Maximum measurable distance in mm (`DMAX`).
    pub max_distance: Option<u32>,
}

impl ScanGeometry {
    /// Angle of `index` in radian, 0 at the front index.
    pub fn angle_of(&self, index: u32) -> f64 {
        let steps = index as f64 - self.front_index as f64;
        2.0 * std::f64::consts::PI * steps / self.angular_resolution as f64
    }

    /// Duration of one revolution in seconds.
    pub fn cycle_seconds(&self) -> f64 {
        60.0 / self.rotation_rpm as f64
    }

    /// Number of entries in a full frame (indices `0..=max_index`).
    pub fn frame_len(&self) -> usize {
        self.max_index as usize + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urg_04lx() -> ScanGeometry {
        ScanGeometry {
            min_index: 44,
            max_index: 725,
            front_index: 384,
            angular_resolution: 1024,
            rotation_rpm: 600,
            min_distance: Some(20),
            max_distance: Some(5600),
        }
    }

    #[test]
    fn test_angle_of_front_is_zero() {
        let geometry = urg_04lx();
        assert_eq!(geometry.angle_of(384), 0.0);
        let quarter = geometry.angle_of(384 + 256);
        assert!((quarter - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_angle_of_is_monotonic() {
        let geometry = urg_04lx();
        let mut previous = geometry.angle_of(0);
        for index in 1..1024 {
            let angle = geometry.angle_of(index);
            assert!(angle > previous);
            previous = angle;
        }
    }

    #[test]
    fn test_cycle_seconds() {
        assert!((urg_04lx().cycle_seconds() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_frame_len_includes_max_index() {
        assert_eq!(urg_04lx().frame_len(), 726);
    }

    #[test]
    fn test_parameter_map_overwrites() {
        let mut map = ParameterMap::new();
        map.insert(KEY_MIN_INDEX, "44");
        map.insert(KEY_MIN_INDEX, "50");
        assert_eq!(map.get(KEY_MIN_INDEX), Some("50"));
        assert_eq!(map.len(), 1);
    }
}
