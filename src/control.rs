//! The typed command surface: one round-trip per call, serialized by a session-level mutex so
//! concurrent callers can never interleave frames on the wire.

use crate::command::{opcode, Command};
use crate::error::{CommandKind, DriverError};
use crate::point::Point;
use crate::status::{ResponseFrame, ResponseKind, StatusSnapshot, PLAYBACK_FLAG_ERROR, PLAYBACK_FLAG_UNDERFLOW};
use crate::transport::Transport;
use std::net::ToSocketAddrs;
use std::sync::Mutex;

/// The outcome of a `WriteData` command: unlike every other command, a `NakFull` response is not
/// a failure — the engine treats it as a signal to re-query and retry at the next pacing cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WriteOutcome {
    Accepted(StatusSnapshot),
    Full(StatusSnapshot),
}

impl WriteOutcome {
    pub fn status(&self) -> StatusSnapshot {
        match *self {
            WriteOutcome::Accepted(s) | WriteOutcome::Full(s) => s,
        }
    }
}

struct SessionState {
    transport: Transport,
    last_status: StatusSnapshot,
}

/// An established connection to a device: owns the transport and the most recently ACKed
/// [`StatusSnapshot`], and serializes all command/response traffic.
pub struct Session {
    state: Mutex<SessionState>,
    /// Firmware identification string read once at connect time (trimmed of NULs/whitespace).
    pub firmware_string: String,
}

impl Session {
    /// Connect to a device at `addr`, consume its proactive hello response, and fetch its
    /// firmware identification string.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Session, DriverError> {
        let mut transport = Transport::connect(addr)?;

        let hello_bytes = transport.read_exact(ResponseFrame::SIZE_BYTES)?;
        let hello = ResponseFrame::parse(&hello_bytes)?;
        if hello.echoed_opcode != opcode::PING || hello.response_kind() != ResponseKind::Ack {
            return Err(DriverError::Protocol {
                kind: CommandKind::Ping,
                expected: b'a',
                got: hello.response,
                status: hello.status,
            });
        }
        let last_status = hello.status;

        let firmware_bytes = {
            transport.write_all(&Command::Version.encode())?;
            transport.read_exact(32)?
        };
        let firmware_string = trim_firmware_string(&firmware_bytes);

        tracing::info!(firmware = %firmware_string, status = %last_status, "connected to device");

        Ok(Session {
            state: Mutex::new(SessionState { transport, last_status }),
            firmware_string,
        })
    }

    /// The most recently ACKed status. May be stale with respect to a command currently in
    /// flight on another thread.
    pub fn last_status(&self) -> StatusSnapshot {
        self.state.lock().unwrap().last_status
    }

    /// Whether the device needs a `Prepare` before it will accept `Begin`/`WriteData`: true when
    /// idle, or when an error/underflow flag is currently asserted.
    pub fn should_prepare(status: &StatusSnapshot) -> bool {
        status.playback_state == 0 // Idle
            || status.playback_flags & PLAYBACK_FLAG_ERROR != 0
            || status.playback_flags & PLAYBACK_FLAG_UNDERFLOW != 0
    }

    pub fn ping(&self) -> Result<StatusSnapshot, DriverError> {
        self.issue(CommandKind::Ping, Command::Ping)
    }

    pub fn prepare(&self) -> Result<StatusSnapshot, DriverError> {
        self.issue(CommandKind::Prepare, Command::Prepare)
    }

    pub fn begin(&self, lwm: u16, rate: u32) -> Result<StatusSnapshot, DriverError> {
        self.issue(CommandKind::Begin, Command::Begin { lwm, rate })
    }

    pub fn update(&self, lwm: u16, rate: u32) -> Result<StatusSnapshot, DriverError> {
        self.issue(CommandKind::Update, Command::Update { lwm, rate })
    }

    pub fn stop(&self) -> Result<StatusSnapshot, DriverError> {
        self.issue(CommandKind::Stop, Command::Stop)
    }

    pub fn clear_e_stop(&self) -> Result<StatusSnapshot, DriverError> {
        self.issue(CommandKind::ClearEStop, Command::ClearEStop)
    }

    /// The only command the device guarantees will ACK in every state.
    pub fn emergency_stop(&self) -> Result<StatusSnapshot, DriverError> {
        self.issue(CommandKind::EmergencyStop, Command::EmergencyStop)
    }

    /// Write a chunk of samples. Unlike the other commands, `NakFull` is reported back as
    /// [`WriteOutcome::Full`] rather than as an error: the caller is expected to back off and
    /// retry, not abort.
    pub fn write_data(&self, points: &[Point]) -> Result<WriteOutcome, DriverError> {
        let mut state = self.state.lock().unwrap();
        Self::write_data_locked(&mut state, points)
    }

    /// Write a chunk and, only when it is accepted and `began` is still false, issue `Begin`
    /// before the session mutex is released. The streaming engine uses this instead of a separate
    /// `write_data` followed by `begin`: splitting the two across two lock acquisitions would let
    /// another command land on the wire between a chunk's acceptance and the stream actually
    /// starting, which the device's at-most-one-command-in-flight contract forbids.
    ///
    /// Returns the write outcome plus the `began` flag the caller should carry into its next
    /// call (`true` once `Begin` has been issued, whether by this call or an earlier one).
    pub fn write_data_then_begin(
        &self,
        points: &[Point],
        scan_rate: u32,
        began: bool,
    ) -> Result<(WriteOutcome, bool), DriverError> {
        let mut state = self.state.lock().unwrap();
        let outcome = Self::write_data_locked(&mut state, points)?;
        if began || !matches!(outcome, WriteOutcome::Accepted(_)) {
            return Ok((outcome, began));
        }
        Self::issue_locked(&mut state, CommandKind::Begin, Command::Begin { lwm: 0, rate: scan_rate })?;
        Ok((outcome, true))
    }

    fn write_data_locked(
        state: &mut SessionState,
        points: &[Point],
    ) -> Result<WriteOutcome, DriverError> {
        let command = Command::WriteData { points };
        let frame = Self::round_trip(&mut state.transport, &command)?;
        Self::validate_echo(CommandKind::WriteData, &command, &frame)?;
        match frame.response_kind() {
            ResponseKind::Ack => {
                state.last_status = frame.status;
                Ok(WriteOutcome::Accepted(frame.status))
            }
            ResponseKind::NakFull => {
                state.last_status = frame.status;
                Ok(WriteOutcome::Full(frame.status))
            }
            ResponseKind::NakInvalid => {
                Err(DriverError::State { kind: CommandKind::WriteData, status: frame.status })
            }
            ResponseKind::NakStopCondition => {
                Err(DriverError::StopCondition { status: frame.status })
            }
            ResponseKind::Other(got) => Err(DriverError::Protocol {
                kind: CommandKind::WriteData,
                expected: b'a',
                got,
                status: frame.status,
            }),
        }
    }

    fn issue(&self, kind: CommandKind, command: Command) -> Result<StatusSnapshot, DriverError> {
        let mut state = self.state.lock().unwrap();
        Self::issue_locked(&mut state, kind, command)
    }

    fn issue_locked(
        state: &mut SessionState,
        kind: CommandKind,
        command: Command,
    ) -> Result<StatusSnapshot, DriverError> {
        let frame = Self::round_trip(&mut state.transport, &command)?;
        Self::validate_echo(kind, &command, &frame)?;
        match frame.response_kind() {
            ResponseKind::Ack => {
                state.last_status = frame.status;
                Ok(frame.status)
            }
            ResponseKind::NakStopCondition if kind == CommandKind::ClearEStop => {
                Err(DriverError::StopCondition { status: frame.status })
            }
            ResponseKind::NakInvalid | ResponseKind::NakFull | ResponseKind::NakStopCondition => {
                Err(DriverError::State { kind, status: frame.status })
            }
            ResponseKind::Other(got) => {
                Err(DriverError::Protocol { kind, expected: b'a', got, status: frame.status })
            }
        }
    }

    fn round_trip(
        transport: &mut Transport,
        command: &Command,
    ) -> Result<ResponseFrame, DriverError> {
        transport.write_all(&command.encode())?;
        let bytes = transport.read_exact(ResponseFrame::SIZE_BYTES)?;
        ResponseFrame::parse(&bytes)
    }

    fn validate_echo(
        kind: CommandKind,
        command: &Command,
        frame: &ResponseFrame,
    ) -> Result<(), DriverError> {
        if frame.echoed_opcode != command.opcode() {
            return Err(DriverError::Protocol {
                kind,
                expected: command.opcode(),
                got: frame.echoed_opcode,
                status: frame.status,
            });
        }
        Ok(())
    }
}

fn trim_firmware_string(bytes: &[u8]) -> String {
    let nul_trimmed = match bytes.iter().position(|&b| b == 0) {
        Some(idx) => &bytes[..idx],
        None => bytes,
    };
    String::from_utf8_lossy(nul_trimmed).trim().to_string()
}

use crate::codec::ConstSizeBytes;
