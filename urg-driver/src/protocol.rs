use crate::codec::to_string;
use crate::constants::{
    CMD_GET_PARAMETER, CMD_GET_VERSION, CMD_LASER_OFF, CMD_LASER_ON, CMD_SCIP2,
    STATUS_LASER_ALREADY_ON, STATUS_OK,
};
use crate::error::UrgError;
use crate::parameters::{parse_parameters, parse_version};
use crate::response::{validate_response, ResponseBlock};
use crate::transport::Transport;
use log::{debug, trace};
use urg_data::{ParameterMap, VersionInfo};

/// Progress of the command most recently sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandState {
    Idle,
    Sent,
    AwaitingLines,
    Complete,
    Failed,
}

/// A command and the status lines that acknowledge it.
pub(crate) struct Command<'a> {
    pub(crate) bytes: &'a [u8],
    pub(crate) accepted_status: &'a [&'a [u8]],
    /// Discard stale input before sending.
    pub(crate) flush_input: bool,
}

const GET_PARAMETER: Command<'static> = Command {
    bytes: CMD_GET_PARAMETER,
    accepted_status: &[STATUS_OK],
    flush_input: false,
};

const GET_VERSION: Command<'static> = Command {
    bytes: CMD_GET_VERSION,
    accepted_status: &[STATUS_OK],
    flush_input: true,
};

const LASER_ON: Command<'static> = Command {
    bytes: CMD_LASER_ON,
    accepted_status: &[STATUS_OK, STATUS_LASER_ALREADY_ON],
    flush_input: false,
};

const LASER_OFF: Command<'static> = Command {
    bytes: CMD_LASER_OFF,
    accepted_status: &[STATUS_OK],
    flush_input: true,
};

/// Sends SCIP2.0 commands and collects their response blocks.
pub struct CommandProtocol<T> {
    transport: T,
    state: CommandState,
}

impl<T: Transport> CommandProtocol<T> {
    pub fn new(transport: T) -> CommandProtocol<T> {
        CommandProtocol {
            transport,
            state: CommandState::Idle,
        }
    }

    pub fn state(&self) -> CommandState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub(crate) fn send(&mut self, bytes: &[u8], flush_input: bool) -> Result<(), UrgError> {
        debug!("send {:?}", to_string(bytes));
        let result = if flush_input {
            self.transport.flush_input()
        } else {
            Ok(())
        };
        match result.and_then(|_| self.transport.write_all(bytes)) {
            Ok(()) => {
                self.state = CommandState::Sent;
                Ok(())
            }
            Err(e) => {
                self.state = CommandState::Failed;
                Err(e)
            }
        }
    }

    /// Read lines until the empty terminator line.
    pub(crate) fn receive_block(&mut self) -> Result<ResponseBlock, UrgError> {
        self.state = CommandState::AwaitingLines;
        let mut block = ResponseBlock::new();
        loop {
            let line = match self.transport.read_line() {
                Ok(line) => line,
                Err(e) => {
                    self.state = CommandState::Failed;
                    return Err(e);
                }
            };
            if line.is_empty() {
                debug!("timed out after {} lines", block.len());
                self.state = CommandState::Failed;
                return Err(UrgError::TimeoutError());
            }
            if line.len() <= 1 {
                trace!("received block of {} lines", block.len());
                self.state = CommandState::Complete;
                return Ok(block);
            }
            block.push(line);
        }
    }

    /// Receive a block and check its echo and status lines.
    pub(crate) fn receive_validated(
        &mut self,
        echo: &[u8],
        accepted_status: &[&[u8]],
    ) -> Result<ResponseBlock, UrgError> {
        let block = self.receive_block()?;
        if let Err(e) = validate_response(&block, echo, accepted_status) {
            self.state = CommandState::Failed;
            return Err(e);
        }
        Ok(block)
    }

    pub(crate) fn invoke(&mut self, command: &Command) -> Result<ResponseBlock, UrgError> {
        self.send(command.bytes, command.flush_input)?;
        self.receive_validated(command.bytes, command.accepted_status)
    }

    /// Switch the device to SCIP2.0. The reply is read but not checked.
    pub fn set_scip2(&mut self) -> Result<(), UrgError> {
        self.send(CMD_SCIP2, true)?;
        match self.receive_block() {
            Ok(block) => {
                debug!("SCIP2.0 answered with {} lines", block.len());
                Ok(())
            }
            Err(UrgError::TimeoutError()) => {
                debug!("SCIP2.0 got no complete answer");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn get_parameter(&mut self) -> Result<ParameterMap, UrgError> {
        let block = self.invoke(&GET_PARAMETER)?;
        parse_parameters(&block)
    }

    pub fn get_version(&mut self) -> Result<VersionInfo, UrgError> {
        let block = self.invoke(&GET_VERSION)?;
        parse_version(&block)
    }

    pub fn laser_on(&mut self) -> Result<(), UrgError> {
        self.invoke(&LASER_ON).map(|_| ())
    }

    pub fn laser_off(&mut self) -> Result<(), UrgError> {
        self.invoke(&LASER_OFF).map(|_| ())
    }
}
