//! The people trying to get past each other in the hallway.
//!
//! A [`Walker`] repeatedly tries to step to one side of the hallway. Stepping to a side means
//! claiming its [`ResourceCounter`], waiting a beat of the shared [`Cadence`], and checking
//! whether anyone else stepped the same way. Two polite walkers who keep mirroring each other
//! never deadlock, since nobody holds anything while waiting on anybody else, but they can
//! livelock until their patience runs out.
//!
//! [`Walker`]: struct.Walker.html
//! [`ResourceCounter`]: ../counter/struct.ResourceCounter.html
//! [`Cadence`]: ../cadence/struct.Cadence.html

use std::fmt::{self, Write};
use std::sync::Arc;

use tracing::{debug, info};

use crate::cadence::Cadence;
use crate::counter::ResourceCounter;

/// One side of the hallway.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The left-hand side, always tried first.
    Left,
    /// The right-hand side, tried when left is contested.
    Right,
}

impl Direction {
    /// Both directions, in the order a walker tries them.
    pub const ALL: [Direction; 2] = [Direction::Left, Direction::Right];

    /// Returns the lowercase name used in traces.
    pub fn name(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The shared state every walker contends over: one counter per side, and the cadence that paces
/// their steps.
#[derive(Debug)]
pub struct Hallway {
    left: ResourceCounter,
    right: ResourceCounter,
    cadence: Arc<Cadence>,
}

impl Hallway {
    /// Creates an empty hallway paced by `cadence`.
    pub fn new(cadence: Arc<Cadence>) -> Hallway {
        Hallway {
            left: ResourceCounter::new(),
            right: ResourceCounter::new(),
            cadence,
        }
    }

    /// Returns the counter for the given side.
    pub fn side(&self, direction: Direction) -> &ResourceCounter {
        match direction {
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }

    /// Returns the cadence pacing this hallway.
    pub fn cadence(&self) -> &Arc<Cadence> {
        &self.cadence
    }

    fn take_step(&self) {
        self.cadence.wait();
    }
}

/// How a walk ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The walker was the only one on a side and got past.
    Crossed {
        /// The side it got past on.
        direction: Direction,
        /// Which iteration it happened on, counting from 1.
        attempt: usize,
    },
    /// The walker used every attempt without ever having a side to itself.
    GaveUp,
}

/// Everything a walker has to say once it's done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkReport {
    /// The walker's name.
    pub name: String,
    /// How the walk ended.
    pub outcome: Outcome,
    /// Iterations started, never more than the walker's attempt bound.
    pub attempts: usize,
    /// The human-readable history of the walk.
    pub trace: String,
}

impl WalkReport {
    /// Returns whether the walker got past.
    pub fn crossed(&self) -> bool {
        matches!(self.outcome, Outcome::Crossed { .. })
    }
}

/// A single participant in a crossing.
///
/// The walker owns its trace buffer outright, so nothing about its narration is shared with other
/// threads; the only shared state it touches is the hallway's counters.
///
/// # Example
///
/// A walker alone in the hallway gets past on its first try:
///
/// ```
/// use hallway::{Cadence, Direction, Hallway, Metronome, Outcome, Walker};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let cadence = Arc::new(Cadence::new());
/// let metronome = Metronome::start(cadence.clone(), Duration::from_millis(1)).unwrap();
/// let hallway = Hallway::new(cadence);
///
/// let report = Walker::new("Alice", 5).walk(&hallway);
/// metronome.stop();
///
/// assert_eq!(report.outcome, Outcome::Crossed { direction: Direction::Left, attempt: 1 });
/// assert_eq!(report.trace, "Alice is trying to scoot: left. Success");
/// ```
#[derive(Debug)]
pub struct Walker {
    name: String,
    max_attempts: usize,
    attempts: usize,
    trace: String,
}

impl Walker {
    /// Creates a walker who will try at most `max_attempts` times.
    pub fn new<S: Into<String>>(name: S, max_attempts: usize) -> Walker {
        Walker {
            name: name.into(),
            max_attempts,
            attempts: 0,
            trace: String::new(),
        }
    }

    /// Returns the walker's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tries to get past, consuming the walker and returning its report.
    ///
    /// Each iteration tries the left side, then the right side. The walk ends as soon as one of
    /// those succeeds, or after `max_attempts` iterations where both failed.
    pub fn walk(mut self, hallway: &Hallway) -> WalkReport {
        // writing to a String cannot fail
        let _ = write!(self.trace, "{} is trying to scoot:", self.name);

        let outcome = self.scoot(hallway);

        match outcome {
            Outcome::Crossed { direction, attempt } => {
                info!(walker = %self.name, %direction, attempt, "crossed");
            }
            Outcome::GaveUp => {
                let _ = write!(
                    self.trace,
                    "\n{} tosses up their hands in exasperation!",
                    self.name
                );
                info!(walker = %self.name, attempts = self.attempts, "gave up");
            }
        }

        WalkReport {
            name: self.name,
            outcome,
            attempts: self.attempts,
            trace: self.trace,
        }
    }

    fn scoot(&mut self, hallway: &Hallway) -> Outcome {
        while self.attempts < self.max_attempts {
            self.attempts += 1;

            for direction in Direction::ALL {
                if self.try_side(hallway, direction) {
                    return Outcome::Crossed {
                        direction,
                        attempt: self.attempts,
                    };
                }
            }
        }

        Outcome::GaveUp
    }

    fn try_side(&mut self, hallway: &Hallway, direction: Direction) -> bool {
        let side = hallway.side(direction);
        let _ = write!(self.trace, " {}", direction);

        side.claim();
        hallway.take_step();

        let observed = side.load();
        if observed == 1 {
            self.trace.push_str(". Success");
            return true;
        }

        debug!(
            walker = %self.name,
            %direction,
            observed,
            attempt = self.attempts,
            "side is contested"
        );

        // hold the position for one more beat so the other walker sees us, then step back
        hallway.take_step();
        side.release();
        false
    }
}
