//! The crate-wide error taxonomy.

use crate::status::StatusSnapshot;
use thiserror::Error;

/// The kind of command that was being sent when a [`DriverError::Protocol`] or
/// [`DriverError::State`] error occurred.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Ping,
    Version,
    Prepare,
    Begin,
    Update,
    WriteData,
    Stop,
    ClearEStop,
    EmergencyStop,
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            CommandKind::Ping => "ping",
            CommandKind::Version => "version",
            CommandKind::Prepare => "prepare",
            CommandKind::Begin => "begin",
            CommandKind::Update => "update",
            CommandKind::WriteData => "write_data",
            CommandKind::Stop => "stop",
            CommandKind::ClearEStop => "clear_e_stop",
            CommandKind::EmergencyStop => "emergency_stop",
        };
        f.write_str(name)
    }
}

/// All errors reported by this crate. No fallible path swallows its failure: every operation that
/// can fail returns `Result<_, DriverError>`.
#[derive(Error, Debug)]
pub enum DriverError {
    /// A TCP or UDP failure, including connection drop and read/connect timeouts.
    #[error("I/O error talking to the device: {0}")]
    Io(#[from] std::io::Error),

    /// Well-formed bytes came back but the echoed opcode or response byte didn't match what was
    /// expected.
    #[error(
        "protocol error on {kind}: expected response {expected:?}, got {got:?} (status: {status:?})"
    )]
    Protocol { kind: CommandKind, expected: u8, got: u8, status: StatusSnapshot },

    /// Bytes that should decode to a status, response or beacon frame were too short or otherwise
    /// malformed.
    #[error("decode error: expected at least {expected} bytes, got {got}")]
    Decode { expected: usize, got: usize },

    /// A command was rejected because the device is not in a compatible state, e.g. `Begin`
    /// before `Prepare` returns NAK-Invalid.
    #[error("{kind} rejected: device not in a compatible state (status: {status:?})")]
    State { kind: CommandKind, status: StatusSnapshot },

    /// `clear_e_stop` was attempted while the physical stop condition is still asserted.
    #[error("cannot clear e-stop: physical stop condition still asserted (status: {status:?})")]
    StopCondition { status: StatusSnapshot },
}
