use crate::constants::LINE_TERMINATOR;
use crate::error::UrgError;
use crate::transport::Transport;
use log::{debug, trace};
use serialport::{ClearBuffer, SerialPort};
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

const READ_CHUNK_SIZE: usize = 256;

/// `Transport` over a serial port.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    timeout: Duration,
    pending: Vec<u8>,
}

impl SerialTransport {
    /// Open `port_name` at `baud_rate`. `timeout` bounds every `read_line`.
    pub fn open(
        port_name: &str,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<SerialTransport, UrgError> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(timeout)
            .open()?;
        Ok(SerialTransport::from_port(port, timeout))
    }

    pub fn from_port(port: Box<dyn SerialPort>, timeout: Duration) -> SerialTransport {
        SerialTransport {
            port,
            timeout,
            pending: Vec::new(),
        }
    }

    pub fn name(&self) -> Option<String> {
        self.port.name()
    }

    fn take_line(&mut self) -> Option<Vec<u8>> {
        let end = self.pending.iter().position(|&b| b == LINE_TERMINATOR)?;
        Some(self.pending.drain(..=end).collect())
    }
}

impl Transport for SerialTransport {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), UrgError> {
        trace!("write {:?}", String::from_utf8_lossy(bytes));
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Vec<u8>, UrgError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(line) = self.take_line() {
                trace!("read {:?}", String::from_utf8_lossy(&line));
                return Ok(line);
            }
            let now = Instant::now();
            if now >= deadline {
                if !self.pending.is_empty() {
                    debug!(
                        "discarding unterminated input {:?}",
                        String::from_utf8_lossy(&self.pending)
                    );
                    self.pending.clear();
                }
                return Ok(Vec::new());
            }

            // A single read must not run past the deadline.
            self.port.set_timeout(deadline - now)?;
            let mut chunk = [0u8; READ_CHUNK_SIZE];
            match self.port.read(&mut chunk) {
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::TimedOut => (),
                Err(e) => return Err(UrgError::IoError(e)),
            }
        }
    }

    fn flush_input(&mut self) -> Result<(), UrgError> {
        self.pending.clear();
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), UrgError> {
        self.pending.clear();
        self.port.flush()?;
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::protocol::{CommandProtocol, CommandState};
    use crate::time::sleep_ms;
    use serialport::TTYPort;

    fn pair() -> (TTYPort, SerialTransport) {
        let (master, slave) = TTYPort::pair().expect("Unable to create ptty pair");
        let slave_ptr = Box::new(slave) as Box<dyn SerialPort>;
        (
            master,
            SerialTransport::from_port(slave_ptr, Duration::from_millis(100)),
        )
    }

    #[test]
    fn test_read_line() {
        let (mut master, mut transport) = pair();
        master.write_all(b"PP\n00P\n\n").unwrap();
        sleep_ms(10);

        assert_eq!(transport.read_line().unwrap(), b"PP\n");
        assert_eq!(transport.read_line().unwrap(), b"00P\n");
        assert_eq!(transport.read_line().unwrap(), b"\n");
    }

    #[test]
    fn test_read_line_times_out() {
        let (_master, mut transport) = pair();
        assert!(transport.read_line().unwrap().is_empty());
    }

    #[test]
    fn test_read_line_discards_unterminated_input() {
        let (mut master, mut transport) = pair();
        master.write_all(b"00P\nX").unwrap();
        sleep_ms(10);

        assert_eq!(transport.read_line().unwrap(), b"00P\n");
        assert!(transport.read_line().unwrap().is_empty());

        master.write_all(b"\n").unwrap();
        sleep_ms(10);
        assert_eq!(transport.read_line().unwrap(), b"\n");
    }

    #[test]
    fn test_read_line_respects_deadline() {
        let (_master, mut transport) = pair();
        let t0 = Instant::now();
        assert!(transport.read_line().unwrap().is_empty());
        assert!(t0.elapsed() < Duration::from_millis(190));
    }

    #[test]
    fn test_unterminated_reply_fails_command() {
        let (mut master, transport) = pair();
        master.write_all(b"BM\n00P\nX").unwrap();
        sleep_ms(10);

        let mut protocol = CommandProtocol::new(transport);
        assert!(matches!(
            protocol.laser_on(),
            Err(UrgError::TimeoutError())
        ));
        assert_eq!(protocol.state(), CommandState::Failed);
    }

    #[test]
    fn test_write_all() {
        let (mut master, mut transport) = pair();
        transport.write_all(b"BM\n").unwrap();

        sleep_ms(10);

        let mut buf = [0u8; 3];
        master.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"BM\n");
    }

    #[test]
    fn test_flush_input() {
        let (mut master, mut transport) = pair();
        master.write_all(b"stale\n").unwrap();
        sleep_ms(10);
        transport.flush_input().unwrap();

        master.write_all(b"QT\n").unwrap();
        sleep_ms(10);
        assert_eq!(transport.read_line().unwrap(), b"QT\n");
    }
}
