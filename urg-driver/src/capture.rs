use crate::codec::{decode_sequence, decode_value, strip_checksum, verify_checksum};
use crate::config::ChecksumPolicy;
use crate::constants::{
    CLUSTER_COUNT, MAX_COMMAND_INDEX, MULTI_SCAN_COUNT, MULTI_SCAN_INTERVAL,
    STATUS_MULTI_SCAN_DATA, STATUS_OK, TIMESTAMP_WIDTH,
};
use crate::error::UrgError;
use crate::protocol::CommandProtocol;
use crate::response::ResponseBlock;
use crate::scan::UrgScan;
use crate::transport::Transport;
use log::trace;
use urg_data::{ScanFrame, ScanGeometry};

/// Distance capture command family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaptureKind {
    /// `GD`: single scan, 3 characters per value.
    #[default]
    Distance,
    /// `GS`: single scan, 2 characters per value.
    ShortDistance,
    /// `MD`: multi scan, 3 characters per value.
    MultiDistance,
    /// `MS`: multi scan, 2 characters per value.
    MultiShortDistance,
}

impl CaptureKind {
    pub fn code(&self) -> &'static str {
        match self {
            CaptureKind::Distance => "GD",
            CaptureKind::ShortDistance => "GS",
            CaptureKind::MultiDistance => "MD",
            CaptureKind::MultiShortDistance => "MS",
        }
    }

    /// Number of characters encoding one distance.
    pub fn group_size(&self) -> usize {
        match self {
            CaptureKind::Distance | CaptureKind::MultiDistance => 3,
            CaptureKind::ShortDistance | CaptureKind::MultiShortDistance => 2,
        }
    }

    pub fn is_multi_scan(&self) -> bool {
        matches!(
            self,
            CaptureKind::MultiDistance | CaptureKind::MultiShortDistance
        )
    }
}

/// A rendered capture request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureCommand {
    pub start: u32,
    pub stop: u32,
    pub kind: CaptureKind,
    bytes: Vec<u8>,
}

impl CaptureCommand {
    pub fn new(start: u32, stop: u32, kind: CaptureKind) -> Result<CaptureCommand, UrgError> {
        if start > stop || stop > MAX_COMMAND_INDEX {
            return Err(UrgError::InvalidRange(start, stop));
        }
        let bytes = render(kind, start, stop, MULTI_SCAN_COUNT);
        Ok(CaptureCommand {
            start,
            stop,
            kind,
            bytes,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    // Multi scan data blocks echo the number of scans still to come.
    fn data_echo(&self) -> Vec<u8> {
        render(self.kind, self.start, self.stop, MULTI_SCAN_COUNT - 1)
    }
}

fn render(kind: CaptureKind, start: u32, stop: u32, n_scans: u32) -> Vec<u8> {
    let mut command = format!("{}{:04}{:04}{:02}", kind.code(), start, stop, CLUSTER_COUNT);
    if kind.is_multi_scan() {
        command.push_str(&format!("{:01}{:02}", MULTI_SCAN_INTERVAL, n_scans));
    }
    command.push('\n');
    command.into_bytes()
}

/// Build a capture command. Missing bounds default to the measurable range.
pub fn build_command(
    geometry: &ScanGeometry,
    start: Option<u32>,
    stop: Option<u32>,
    kind: CaptureKind,
) -> Result<CaptureCommand, UrgError> {
    let start = start.unwrap_or(geometry.min_index);
    let stop = stop.unwrap_or(geometry.max_index);
    if stop > geometry.max_index {
        return Err(UrgError::InvalidRange(start, stop));
    }
    CaptureCommand::new(start, stop, kind)
}

/// Read the reply to a capture command that was just sent.
pub(crate) fn retrieve_capture<T: Transport>(
    protocol: &mut CommandProtocol<T>,
    command: &CaptureCommand,
    geometry: &ScanGeometry,
    checksum_policy: ChecksumPolicy,
) -> Result<ScanFrame, UrgError> {
    let block = if command.kind.is_multi_scan() {
        protocol.receive_validated(command.as_bytes(), &[STATUS_OK])?;
        protocol.receive_validated(&command.data_echo(), &[STATUS_MULTI_SCAN_DATA])?
    } else {
        protocol.receive_validated(command.as_bytes(), &[STATUS_OK])?
    };
    decode_capture(&block, command, geometry, checksum_policy)
}

/// Decode a validated capture block into a frame.
pub(crate) fn decode_capture(
    block: &ResponseBlock,
    command: &CaptureCommand,
    geometry: &ScanGeometry,
    checksum_policy: ChecksumPolicy,
) -> Result<ScanFrame, UrgError> {
    let timestamp_line = block
        .get(2)
        .ok_or_else(|| UrgError::DecodeError("capture reply has no timestamp".to_string()))?;
    let encoded_timestamp = line_payload(timestamp_line, checksum_policy)?;
    if encoded_timestamp.len() != TIMESTAMP_WIDTH {
        return Err(UrgError::DecodeError(format!(
            "timestamp must be {} characters, got {}",
            TIMESTAMP_WIDTH,
            encoded_timestamp.len()
        )));
    }
    let timestamp = decode_value(encoded_timestamp)?;

    let mut encoded = Vec::new();
    for line in block.iter().skip(3) {
        encoded.extend_from_slice(line_payload(line, checksum_policy)?);
    }
    let values = decode_sequence(&encoded, command.kind.group_size())?;
    let n_expected = (command.stop - command.start + 1) as usize;
    if values.len() != n_expected {
        return Err(UrgError::DecodeError(format!(
            "expected {} values for {}..={}, got {}",
            n_expected,
            command.start,
            command.stop,
            values.len()
        )));
    }
    trace!(
        "decoded {} values for {}..={}",
        values.len(),
        command.start,
        command.stop
    );

    Ok(ScanFrame::from_measurements(
        timestamp,
        command.start,
        &values,
        geometry,
    ))
}

fn line_payload(line: &[u8], checksum_policy: ChecksumPolicy) -> Result<&[u8], UrgError> {
    match checksum_policy {
        ChecksumPolicy::Verify => verify_checksum(line),
        ChecksumPolicy::Ignore => Ok(strip_checksum(line)),
    }
}
