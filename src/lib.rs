//! Two people meet in a hallway and both politely step aside, into each other's way, again and
//! again.
//!
//! This crate simulates that crossing to show how a deadlock is avoided (nobody holds anything
//! while waiting on anybody else) and how the same politeness can turn into a livelock that only
//! an attempt limit breaks. It is built from a few small synchronization primitives:
//!
//! * [`Cadence`], a broadcast pulse that wakes every waiting thread at once, and the
//!   [`Metronome`] that pulses it on a fixed period, so walkers move in lockstep.
//! * [`ResourceCounter`], an atomic claim count for each side of the hallway.
//! * [`CountdownEvent`], a primitive that keeps a counter and allows a thread to wait until the
//!   counter reaches zero, used to wait for every walker to finish.
//!
//! The [`Walker`] and [`Crossing`] types put these together. The [`demos`] module holds the
//! simpler hazards the crossing is contrasted with: a race, a mutex, a lock-order deadlock, and a
//! worker pool.
//!
//! # Example
//!
//! ```
//! use hallway::{Crossing, CrossingConfig, Direction};
//!
//! let summary = Crossing::new(CrossingConfig::default())
//!     .unwrap()
//!     .run(|report| println!("{}", report.trace))
//!     .unwrap();
//!
//! // every losing claim was taken back
//! for direction in Direction::ALL {
//!     assert_eq!(summary.side(direction).value as usize, summary.winners(direction));
//! }
//! ```
//!
//! [`Cadence`]: cadence/struct.Cadence.html
//! [`Metronome`]: cadence/struct.Metronome.html
//! [`ResourceCounter`]: counter/struct.ResourceCounter.html
//! [`CountdownEvent`]: event/struct.CountdownEvent.html
//! [`Walker`]: walker/struct.Walker.html
//! [`Crossing`]: crossing/struct.Crossing.html
//! [`demos`]: demos/index.html

#![deny(warnings, missing_docs)]

mod util;

pub mod cadence;
pub mod config;
pub mod counter;
pub mod crossing;
pub mod demos;
pub mod event;
pub mod telemetry;
pub mod walker;

pub use cadence::{Cadence, Metronome};
pub use config::{ConfigError, CrossingConfig};
pub use counter::ResourceCounter;
pub use crossing::{Crossing, CrossingError, CrossingSummary, SideTally};
pub use event::{Arrival, CountdownError, CountdownEvent};
pub use walker::{Direction, Hallway, Outcome, WalkReport, Walker};
