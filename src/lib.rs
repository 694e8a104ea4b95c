//! A host-side driver for a networked laser-show digital-to-analog converter (DAC).
//!
//! The DAC consumes a continuous stream of laser sample points over TCP and produces analog XY
//! galvanometer deflection plus RGB intensity signals. Applications supply an unbounded, lazy
//! sequence of colored `(x, y)` samples via [`engine::play`]; this crate paces delivery to the
//! device fast enough to keep its internal ring buffer non-empty, without underrunning (visible
//! flicker) or overrunning (protocol NAK).
//!
//! ## Layout
//!
//! - [`point`] — the in-memory laser sample and its 18-byte wire encoding.
//! - [`status`] — status, response and discovery-beacon frames decoded from the device.
//! - [`command`] — command frames sent from host to device.
//! - [`codec`] — the shared little-endian (de)serialization traits everything above builds on.
//! - [`transport`] — the buffered TCP connection underneath a [`control::Session`].
//! - [`control`] — the typed, mutex-serialized command surface (`prepare`, `begin`, `write_data`,
//!   `ping`, ...).
//! - [`discovery`] — UDP discovery of devices broadcasting on the local network.
//! - [`pipe`] — the bounded byte conduit between a point generator and the streaming engine.
//! - [`engine`] — the producer/consumer streaming engine: the core of this crate.
//! - [`drawing`] — line interpolation, blanking and frame-padding helpers built on the pipe.
//! - [`config`] — the explicit [`config::PlayConfig`] tunables for a play session.
//! - [`error`] — the crate-wide [`error::DriverError`] taxonomy.
//!
//! ## Minimal example
//!
//! ```no_run
//! use etherdream::config::PlayConfig;
//! use etherdream::control::Session;
//! use etherdream::engine::play;
//! use etherdream::point::Point;
//! use std::io::Write;
//!
//! # fn main() -> Result<(), etherdream::error::DriverError> {
//! let (_addr, beacon) = etherdream::discovery::find_first()?;
//! let session = Session::connect((std::net::Ipv4Addr::UNSPECIFIED, etherdream::discovery::DEFAULT_DEVICE_PORT))?;
//! let _ = beacon;
//!
//! let config = PlayConfig::default();
//! let summary = play(&session, config, |mut writer| {
//!     for i in 0..1000i16 {
//!         let p = Point::new(i, -i, 65535, 0, 0);
//!         let _ = writer.write_all(&p.encode());
//!     }
//! })?;
//! println!("played {} points", summary.points_played);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod command;
pub mod config;
pub mod control;
pub mod discovery;
pub mod drawing;
pub mod engine;
pub mod error;
pub mod pipe;
pub mod point;
pub mod status;
pub mod transport;

pub use config::PlayConfig;
pub use control::Session;
pub use engine::{play, PlaySummary};
pub use error::DriverError;
pub use point::Point;
pub use status::StatusSnapshot;
