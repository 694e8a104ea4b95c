//! The streaming engine: couples a user-supplied point generator to the device over the control
//! surface, pacing writes against the device's remote ring-buffer fullness gauge.
//!
//! This is the one piece of the crate with real concurrency in it — everything else (codec,
//! point, status, control surface) is synchronous and thread-neutral. `play` spawns exactly one
//! producer thread; the engine's own pacing loop runs on the calling thread.

use crate::codec::ConstSizeBytes;
use crate::config::PlayConfig;
use crate::control::{Session, WriteOutcome};
use crate::error::DriverError;
use crate::pipe::{point_pipe, PipeReader, PipeWriter};
use crate::point::Point;
use crate::status::PlaybackState;
use std::thread;
use std::time::Duration;

/// How long the pacing loop sleeps before re-polling a device that has no free buffer space, or
/// retrying a chunk the device rejected with NAK-Full.
pub const RETRY_DELAY: Duration = Duration::from_millis(5);

/// How many frames of headroom the point pipe is sized for. A fast generator can run this many
/// frames ahead of the device before `write_bytes` blocks it.
const PIPE_FRAMES_OF_HEADROOM: usize = 4;

/// The outcome of a completed [`play`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaySummary {
    /// Samples successfully accepted by the device over the course of this session.
    pub points_played: u64,
    /// Whether `Begin` was issued (false only if the generator produced zero points).
    pub began: bool,
}

/// Stream `generator`'s points to the device over `session`, pacing writes to the device's free
/// buffer space.
///
/// `generator` runs on its own thread, writing encoded points into a [`PipeWriter`] and dropping
/// it (closing it) once its sequence ends; its return value is not consulted — a side-effecting
/// callback is the canonical producer shape for this crate.
///
/// Returns once the generator's stream is exhausted (clean end of stream) or a fatal error
/// occurs. `play` does not issue `Stop` on exit: callers composing multiple `play` calls, or who
/// want the device left running, are left in control of that decision.
pub fn play<F>(
    session: &Session,
    config: PlayConfig,
    generator: F,
) -> Result<PlaySummary, DriverError>
where
    F: FnOnce(PipeWriter) + Send + 'static,
{
    let _span = tracing::debug_span!(
        "play",
        scan_rate = config.scan_rate,
        frame_points = config.frame_points()
    )
    .entered();

    let status = session.last_status();
    if status.playback_state() != PlaybackState::Playing && Session::should_prepare(&status) {
        tracing::debug!(?status, "play: preparing device before streaming");
        session.prepare()?;
    }

    let frame_points = config.frame_points() as usize;
    let frame_bytes = frame_points * Point::SIZE_BYTES;
    let (writer, mut reader) = point_pipe(frame_bytes * PIPE_FRAMES_OF_HEADROOM);

    let producer = thread::Builder::new()
        .name("point-generator".to_string())
        .spawn(move || generator(writer))
        .map_err(DriverError::Io)?;

    let result = pacing_loop(session, &config, &mut reader, frame_points, frame_bytes);

    if producer.join().is_err() {
        tracing::warn!("play: generator thread panicked");
    }

    result
}

fn pacing_loop(
    session: &Session,
    config: &PlayConfig,
    reader: &mut PipeReader,
    frame_points: usize,
    frame_bytes: usize,
) -> Result<PlaySummary, DriverError> {
    let mut pending: Option<Vec<Point>> = None;
    let mut points_played: u64 = 0;
    let mut began = false;

    loop {
        let status = session.last_status();
        let free = (config.buffer_capacity as u32).saturating_sub(status.buffer_fullness as u32);
        let threshold = (config.buffer_capacity as u32).saturating_sub(frame_points as u32);

        let points = match pending.take() {
            Some(points) => points,
            None => {
                if free <= threshold {
                    thread::sleep(RETRY_DELAY);
                    session.ping()?;
                    continue;
                }
                let mut chunk = vec![0u8; frame_bytes];
                let filled = reader.fill_partial(&mut chunk).map_err(DriverError::Io)?;
                if filled == 0 {
                    tracing::debug!(points_played, "play: generator closed, ending session");
                    break;
                }
                if filled < frame_bytes {
                    tracing::debug!(
                        points_played,
                        bytes = filled,
                        "play: generator closed mid-frame, flushing final partial chunk"
                    );
                }
                decode_chunk(&chunk[..filled])?
            }
        };

        if config.dump {
            tracing::trace!(count = points.len(), "play: writing chunk");
        }

        let points_len = points.len();
        // WriteData and the follow-on Begin must land under the same session-mutex acquisition:
        // releasing the lock in between would let another caller's command land on the wire
        // after the chunk is accepted but before the stream has actually started.
        let (outcome, now_began) = session.write_data_then_begin(&points, config.scan_rate, began)?;
        began = now_began;
        match outcome {
            WriteOutcome::Accepted(status) => {
                points_played += points_len as u64;
                if config.debug {
                    tracing::debug!(%status, points_played, "play: chunk accepted");
                }
            }
            WriteOutcome::Full(status) => {
                if config.debug {
                    tracing::debug!(%status, "play: device reported full, retrying next cycle");
                }
                pending = Some(points);
                thread::sleep(RETRY_DELAY);
                session.ping()?;
            }
        }
    }

    Ok(PlaySummary { points_played, began })
}

fn decode_chunk(bytes: &[u8]) -> Result<Vec<Point>, DriverError> {
    bytes
        .chunks_exact(Point::SIZE_BYTES)
        .map(|c| {
            let array: [u8; Point::SIZE_BYTES] =
                c.try_into().expect("chunks_exact guarantees the right length");
            Point::decode(&array).map_err(DriverError::Io)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_chunk_round_trips_points() {
        let points = vec![Point::new(1, 2, 3, 4, 5), Point::new(-1, -2, 6, 7, 8)];
        let mut bytes = Vec::new();
        for p in &points {
            bytes.extend_from_slice(&p.encode());
        }
        let decoded = decode_chunk(&bytes).unwrap();
        assert_eq!(decoded, points);
    }

    #[test]
    fn decode_chunk_handles_empty_input() {
        assert_eq!(decode_chunk(&[]).unwrap(), Vec::new());
    }
}
