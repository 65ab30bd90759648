//! Driver for Hokuyo URG laser range-finders speaking SCIP2.0 over a serial link.

use std::time::Duration;

mod capture;
pub mod codec;
mod config;
mod constants;
mod driver_threads;
mod error;
#[cfg(test)]
mod mock;
mod parameters;
mod protocol;
mod response;
mod scan;
mod serial;
mod time;
mod transport;

use crate::capture::retrieve_capture;
use log::{info, warn};

pub use crate::capture::{build_command, CaptureCommand, CaptureKind};
pub use crate::config::{ChecksumPolicy, DriverConfig};
pub use crate::constants::{DEFAULT_BAUD_RATE, DEFAULT_PORT_NAME, DEFAULT_TIMEOUT};
pub use crate::driver_threads::{join, run_driver, CaptureMode, DriverThreads, FrameReceiver};
pub use crate::error::UrgError;
pub use crate::parameters::geometry_from;
pub use crate::protocol::{CommandProtocol, CommandState};
pub use crate::serial::SerialTransport;
pub use crate::transport::Transport;
pub use urg_data::{ParameterMap, ScanFrame, ScanGeometry, VersionInfo};

/// Whether the device link is usable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Open,
}

/// A connected URG device.
///
/// Created by a successful handshake, so the parameters and the scan
/// geometry are always available. The laser is turned off and the link is
/// closed on `disconnect` or when the device is dropped.
pub struct UrgDevice<T: Transport = SerialTransport> {
    protocol: Option<CommandProtocol<T>>,
    parameters: ParameterMap,
    geometry: ScanGeometry,
    checksum_policy: ChecksumPolicy,
    capture_kind: CaptureKind,
    fast_command: Option<CaptureCommand>,
    // Set after a failed fast capture so the next one discards late replies.
    resync_input: bool,
}

impl UrgDevice<SerialTransport> {
    /// Function to connect to an URG device.
    /// # Arguments
    ///
    /// * `port_name` - Serial port name such as `/dev/ttyACM0` or `COM18`.
    /// * `baud_rate` - `DEFAULT_BAUD_RATE` for USB models.
    /// * `timeout` - Upper bound for reading one response line.
    pub fn connect(
        port_name: &str,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<UrgDevice<SerialTransport>, UrgError> {
        let config = DriverConfig::new(port_name)
            .baud_rate(baud_rate)
            .timeout(timeout);
        UrgDevice::open(&config)
    }

    pub fn open(config: &DriverConfig) -> Result<UrgDevice<SerialTransport>, UrgError> {
        let transport =
            match SerialTransport::open(&config.port_name, config.baud_rate, config.timeout) {
                Ok(transport) => transport,
                Err(e) => {
                    warn!("Failed to open \"{}\". Error: {}", config.port_name, e);
                    return Err(e);
                }
            };
        UrgDevice::with_transport(transport, config.checksum_policy)
    }
}

impl<T: Transport> UrgDevice<T> {
    /// Switch the device to SCIP2.0 and read its parameters.
    pub fn with_transport(
        transport: T,
        checksum_policy: ChecksumPolicy,
    ) -> Result<UrgDevice<T>, UrgError> {
        let mut protocol = CommandProtocol::new(transport);
        protocol.set_scip2()?;
        let parameters = protocol.get_parameter()?;
        let geometry = geometry_from(&parameters)?;
        info!(
            "connected to {}, indices {}..={}",
            parameters.model().unwrap_or("unknown model"),
            geometry.min_index,
            geometry.max_index
        );

        Ok(UrgDevice {
            protocol: Some(protocol),
            parameters,
            geometry,
            checksum_policy,
            capture_kind: CaptureKind::default(),
            fast_command: None,
            resync_input: false,
        })
    }

    pub fn state(&self) -> ConnectionState {
        match self.protocol {
            Some(_) => ConnectionState::Open,
            None => ConnectionState::Closed,
        }
    }

    /// State of the last command, `None` once disconnected.
    pub fn command_state(&self) -> Option<CommandState> {
        self.protocol.as_ref().map(CommandProtocol::state)
    }

    pub fn transport(&self) -> Option<&T> {
        self.protocol.as_ref().map(CommandProtocol::transport)
    }

    pub fn parameters(&self) -> &ParameterMap {
        &self.parameters
    }

    pub fn geometry(&self) -> &ScanGeometry {
        &self.geometry
    }

    pub fn checksum_policy(&self) -> ChecksumPolicy {
        self.checksum_policy
    }

    pub fn capture_kind(&self) -> CaptureKind {
        self.capture_kind
    }

    /// Command family used by later `capture` and `prep_fast_capture` calls.
    pub fn set_capture_kind(&mut self, kind: CaptureKind) {
        self.capture_kind = kind;
    }

    /// Query the parameters again and replace the stored ones.
    pub fn refresh_parameters(&mut self) -> Result<&ParameterMap, UrgError> {
        let parameters = self.protocol_mut()?.get_parameter()?;
        self.geometry = geometry_from(&parameters)?;
        self.parameters = parameters;
        Ok(&self.parameters)
    }

    pub fn get_version(&mut self) -> Result<VersionInfo, UrgError> {
        self.protocol_mut()?.get_version()
    }

    pub fn laser_on(&mut self) -> Result<(), UrgError> {
        self.protocol_mut()?.laser_on()
    }

    pub fn laser_off(&mut self) -> Result<(), UrgError> {
        self.protocol_mut()?.laser_off()
    }

    /// Capture command for `start..=stop`; `None` means the measurable bound.
    pub fn build_command(
        &self,
        start: Option<u32>,
        stop: Option<u32>,
    ) -> Result<CaptureCommand, UrgError> {
        build_command(&self.geometry, start, stop, self.capture_kind)
    }

    /// Turn the laser on and capture one frame.
    pub fn try_capture(
        &mut self,
        start: Option<u32>,
        stop: Option<u32>,
    ) -> Result<ScanFrame, UrgError> {
        let command = self.build_command(start, stop)?;
        let protocol = self.protocol.as_mut().ok_or(UrgError::NotConnected())?;
        protocol.laser_on()?;
        protocol.send(command.as_bytes(), true)?;
        retrieve_capture(protocol, &command, &self.geometry, self.checksum_policy)
    }

    /// Like `try_capture`, but a failure yields `ScanFrame::empty()`.
    pub fn capture(&mut self, start: Option<u32>, stop: Option<u32>) -> ScanFrame {
        self.try_capture(start, stop).unwrap_or_else(|e| {
            warn!("capture failed: {}", e);
            ScanFrame::empty()
        })
    }

    /// Build the command for `fast_capture` and turn the laser on once.
    pub fn prep_fast_capture(
        &mut self,
        start: Option<u32>,
        stop: Option<u32>,
    ) -> Result<(), UrgError> {
        let command = self.build_command(start, stop)?;
        self.laser_on()?;
        self.fast_command = Some(command);
        self.resync_input = false;
        Ok(())
    }

    /// Capture with the command prepared by `prep_fast_capture`.
    ///
    /// Input is only flushed after a failed fast capture.
    pub fn try_fast_capture(&mut self) -> Result<ScanFrame, UrgError> {
        let command = self
            .fast_command
            .as_ref()
            .ok_or(UrgError::FastCaptureNotPrepared())?;
        let protocol = self.protocol.as_mut().ok_or(UrgError::NotConnected())?;
        let result = protocol
            .send(command.as_bytes(), self.resync_input)
            .and_then(|_| {
                retrieve_capture(protocol, command, &self.geometry, self.checksum_policy)
            });
        self.resync_input = result.is_err();
        result
    }

    /// Like `try_fast_capture`, but a failure yields `ScanFrame::empty()`.
    pub fn fast_capture(&mut self) -> ScanFrame {
        self.try_fast_capture().unwrap_or_else(|e| {
            warn!("fast capture failed: {}", e);
            ScanFrame::empty()
        })
    }

    /// Turn the laser off and close the link. Errors are logged, not returned.
    pub fn disconnect(&mut self) {
        let mut protocol = match self.protocol.take() {
            Some(protocol) => protocol,
            None => return,
        };
        if let Err(e) = protocol.laser_off() {
            warn!("failed to turn the laser off: {}", e);
        }
        if let Err(e) = protocol.transport_mut().close() {
            warn!("failed to close the transport: {}", e);
        }
        self.fast_command = None;
    }

    fn protocol_mut(&mut self) -> Result<&mut CommandProtocol<T>, UrgError> {
        self.protocol.as_mut().ok_or(UrgError::NotConnected())
    }
}

impl<T: Transport> Drop for UrgDevice<T> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
