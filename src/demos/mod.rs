//! Stand-alone demonstrations of the hazards the hallway crossing is built to avoid.
//!
//! Each module is independent of the others and of the crossing, and each has a binary of the
//! same name under `src/bin`.
//!
//! * [`race`]: unsynchronized read-modify-write losing updates, and a check-then-act race.
//! * [`mutex`]: the same operations made safe by mutual exclusion.
//! * [`deadlock`]: two routines taking two locks in opposite order, and the fix.
//! * [`workers`]: a pool of sleeping workers joined with a countdown.
//!
//! [`race`]: race/index.html
//! [`mutex`]: mutex/index.html
//! [`deadlock`]: deadlock/index.html
//! [`workers`]: workers/index.html

pub mod deadlock;
pub mod mutex;
pub mod race;
pub mod workers;

/// How many increments were made, against how many survived.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RaceReport {
    /// Increments performed across all threads.
    pub expected: usize,
    /// The value left in shared memory afterwards.
    pub observed: usize,
}

impl RaceReport {
    /// Returns how many increments were overwritten by another thread.
    pub fn lost(&self) -> usize {
        self.expected - self.observed
    }
}
