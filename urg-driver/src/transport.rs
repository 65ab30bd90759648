use crate::error::UrgError;

/// Line-oriented duplex channel to the device.
///
/// `UrgDevice` only talks to the device through this trait, so any byte
/// stream that can be read line by line can stand in for the serial port.
pub trait Transport {
    /// Write `bytes` to the device.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), UrgError>;

    /// Read one line including its `\n` terminator.
    ///
    /// Blocks up to the transport's timeout. Returns whatever was received
    /// when the timeout elapses, which is empty when nothing arrived.
    fn read_line(&mut self) -> Result<Vec<u8>, UrgError>;

    /// Discard any received but unread bytes.
    fn flush_input(&mut self) -> Result<(), UrgError>;

    /// Release the channel. The transport is dropped right after.
    fn close(&mut self) -> Result<(), UrgError> {
        Ok(())
    }
}
