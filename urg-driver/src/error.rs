use std::error::Error;
use std::fmt::Display;
use std::{fmt, io};

#[derive(Debug)]
pub enum UrgError {
    ProtocolMismatch(String, String),
    InvalidParameterLine(String),
    MissingParameter(String),
    InvalidParameter(String, String),
    DecodeError(String),
    ChecksumMismatch(u8, u8),
    InvalidRange(u32, u32),
    FastCaptureNotPrepared(),
    NotConnected(),
    TimeoutError(),
    SerialError(serialport::Error),
    IoError(io::Error),
}

impl fmt::Display for UrgError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UrgError::ProtocolMismatch(expected, actual) => write!(f, "Expected response line \"{}\" but obtained \"{}\".", expected, actual),
            UrgError::InvalidParameterLine(line) => write!(f, "Parameter line must be formatted as KEY:VALUE;SUM. Observed = {:?}.", line),
            UrgError::MissingParameter(key) => write!(f, "The device did not report parameter {}.", key),
            UrgError::InvalidParameter(key, value) => write!(f, "Parameter {} has an invalid value {:?}.", key, value),
            UrgError::DecodeError(reason) => write!(f, "Failed to decode packed value: {}", reason),
            UrgError::ChecksumMismatch(expected, calculated) => write!(f, "Checksum mismatched. Calculated = {:?}, expected = {:?}.", *calculated as char, *expected as char),
            UrgError::InvalidRange(start, stop) => write!(f, "Invalid capture range {}..={}.", start, stop),
            UrgError::FastCaptureNotPrepared() => write!(f, "prep_fast_capture must be called before fast_capture"),
            UrgError::NotConnected() => write!(f, "The device is not connected"),
            UrgError::TimeoutError() => write!(f, "Operation timed out"),
            UrgError::SerialError(err) => Display::fmt(&err, f),
            UrgError::IoError(err) => Display::fmt(&err, f),
        }
    }
}

impl Error for UrgError {}

impl From<io::Error> for UrgError {
    fn from(err: io::Error) -> Self {
        UrgError::IoError(err)
    }
}

impl From<serialport::Error> for UrgError {
    fn from(err: serialport::Error) -> Self {
        UrgError::SerialError(err)
    }
}
