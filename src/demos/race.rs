//! Race conditions: operations that need to happen in a particular order, with nothing making
//! sure they do.
//!
//! Safe Rust won't compile a true data race, so the shared value here is an atomic. The race is
//! one level up: reading the value and writing back the increment are two separate atomic
//! operations, and another thread can slip in between them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use tracing::debug;

use super::RaceReport;

/// What the checking thread saw.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The check ran before the increment landed.
    Before,
    /// The check ran after the increment landed.
    After,
}

/// Has `threads` threads each bump a shared counter `increments` times using a separate load and
/// store, and reports how many increments survived.
///
/// With more than one thread, `observed` is frequently less than `expected`.
pub fn lost_updates(threads: usize, increments: usize) -> RaceReport {
    let data = AtomicUsize::new(0);

    thread::scope(|s| {
        for _ in 0..threads {
            s.spawn(|| {
                for _ in 0..increments {
                    let current = data.load(Ordering::Relaxed);
                    // widen the window between the read and the write
                    thread::yield_now();
                    data.store(current + 1, Ordering::Relaxed);
                }
            });
        }
    });

    let report = RaceReport {
        expected: threads * increments,
        observed: data.into_inner(),
    };
    debug!(expected = report.expected, observed = report.observed, "unsynchronized updates done");
    report
}

/// Spawns a thread that increments a shared value, waits `delay`, then checks whether the
/// increment has happened yet.
///
/// Nothing orders the check against the increment. A long `delay` makes `After` very likely but
/// never guaranteed, which is the whole point.
pub fn check_then_act(delay: Duration) -> Observation {
    let data = AtomicUsize::new(0);

    thread::scope(|s| {
        s.spawn(|| {
            let current = data.load(Ordering::Relaxed);
            data.store(current + 1, Ordering::Relaxed);
        });

        thread::sleep(delay);

        if data.load(Ordering::Relaxed) == 0 {
            Observation::Before
        } else {
            Observation::After
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{check_then_act, lost_updates, Observation};
    use std::time::Duration;

    #[test]
    fn a_single_thread_loses_nothing() {
        let report = lost_updates(1, 1000);
        assert_eq!(report.expected, 1000);
        assert_eq!(report.observed, 1000);
        assert_eq!(report.lost(), 0);
    }

    #[test]
    fn racing_threads_never_gain_updates() {
        let report = lost_updates(4, 10_000);
        assert_eq!(report.expected, 40_000);
        assert!(report.observed <= report.expected);
    }

    #[test]
    fn a_one_second_check_sees_the_write() {
        // nothing orders the two, but a thread spawn takes far less than a second
        assert_eq!(check_then_act(Duration::from_secs(1)), Observation::After);
    }
}
