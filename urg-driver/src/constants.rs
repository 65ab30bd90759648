use std::time::Duration;

pub(crate) const LINE_TERMINATOR: u8 = b'\n';
pub(crate) const ENCODING_OFFSET: u8 = 0x30;
pub(crate) const ENCODING_MASK: u8 = 0x3F;
// Five characters still fit into 30 bits.
pub(crate) const MAX_ENCODED_WIDTH: usize = 5;
pub(crate) const TIMESTAMP_WIDTH: usize = 4;
// Checksum character plus line terminator.
pub(crate) const LINE_TRAILER_SIZE: usize = 2;

pub(crate) const CMD_SCIP2: &[u8] = b"SCIP2.0\n";
pub(crate) const CMD_GET_PARAMETER: &[u8] = b"PP\n";
pub(crate) const CMD_GET_VERSION: &[u8] = b"VV\n";
pub(crate) const CMD_LASER_ON: &[u8] = b"BM\n";
pub(crate) const CMD_LASER_OFF: &[u8] = b"QT\n";

pub(crate) const STATUS_OK: &[u8] = b"00P\n";
pub(crate) const STATUS_LASER_ALREADY_ON: &[u8] = b"02R\n";
pub(crate) const STATUS_MULTI_SCAN_DATA: &[u8] = b"99b\n";

pub(crate) const N_PARAMETER_LINES: usize = 8;
pub(crate) const N_VERSION_LINES: usize = 5;

pub(crate) const CLUSTER_COUNT: u32 = 1;
pub(crate) const MULTI_SCAN_INTERVAL: u32 = 0;
pub(crate) const MULTI_SCAN_COUNT: u32 = 1;
pub(crate) const MAX_COMMAND_INDEX: u32 = 9999;

pub const DEFAULT_PORT_NAME: &str = "/dev/ttyACM0";
pub const DEFAULT_BAUD_RATE: u32 = 115200;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

// Pause of the capture thread after a failed capture.
pub(crate) const CAPTURE_RETRY_DELAY_MS: u64 = 10;
