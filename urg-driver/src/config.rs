use crate::constants::{DEFAULT_BAUD_RATE, DEFAULT_PORT_NAME, DEFAULT_TIMEOUT};
use std::time::Duration;

/// How checksum characters of capture lines are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChecksumPolicy {
    /// Reject lines whose checksum does not match.
    #[default]
    Verify,
    /// Drop checksum characters without looking at them.
    Ignore,
}

/// Connection settings.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverConfig {
    /// Serial port name such as `/dev/ttyACM0` or `COM3`.
    pub port_name: String,
    pub baud_rate: u32,
    /// Upper bound for reading one response line.
    pub timeout: Duration,
    pub checksum_policy: ChecksumPolicy,
}

impl DriverConfig {
    pub fn new(port_name: &str) -> DriverConfig {
        DriverConfig {
            port_name: port_name.to_string(),
            ..DriverConfig::default()
        }
    }

    pub fn baud_rate(mut self, baud_rate: u32) -> DriverConfig {
        self.baud_rate = baud_rate;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> DriverConfig {
        self.timeout = timeout;
        self
    }

    pub fn checksum_policy(mut self, policy: ChecksumPolicy) -> DriverConfig {
        self.checksum_policy = policy;
        self
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            port_name: DEFAULT_PORT_NAME.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
            checksum_policy: ChecksumPolicy::Verify,
        }
    }
}
