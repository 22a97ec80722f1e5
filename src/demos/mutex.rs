//! Memory access synchronization: the race demonstrations again, with every read-modify-write
//! and every check made while holding a lock.

use std::sync::Mutex;
use std::thread;

use tracing::debug;

use super::RaceReport;
use crate::util;

/// Has `threads` threads each bump a shared counter `increments` times, holding a mutex across
/// each read and write. Nothing is ever lost, so `observed` always equals `expected`.
pub fn guarded_updates(threads: usize, increments: usize) -> RaceReport {
    let data = Mutex::new(0usize);

    thread::scope(|s| {
        for _ in 0..threads {
            s.spawn(|| {
                for _ in 0..increments {
                    let mut value = util::guts(data.lock());
                    let current = *value;
                    thread::yield_now();
                    *value = current + 1;
                }
            });
        }
    });

    let report = RaceReport {
        expected: threads * increments,
        observed: util::guts(data.into_inner()),
    };
    debug!(expected = report.expected, observed = report.observed, "guarded updates done");
    report
}

/// Spawns a thread that increments a shared value under a lock, then reads the value under the
/// same lock, returning what it saw.
///
/// The lock makes the increment and the check mutually exclusive, so the check sees either 0 or
/// 1 and never a half-finished update. Which of the two it sees is still up to the scheduler;
/// a mutex orders access, it doesn't choose the order.
pub fn guarded_check() -> usize {
    let data = Mutex::new(0usize);

    thread::scope(|s| {
        s.spawn(|| {
            *util::guts(data.lock()) += 1;
        });

        let value = *util::guts(data.lock());
        debug!(value, "checked under the lock");
        value
    })
}

#[cfg(test)]
mod tests {
    use super::{guarded_check, guarded_updates};

    #[test]
    fn guarded_updates_lose_nothing() {
        let report = guarded_updates(4, 5_000);
        assert_eq!(report.expected, 20_000);
        assert_eq!(report.observed, 20_000);
        assert_eq!(report.lost(), 0);
    }

    #[test]
    fn guarded_check_sees_a_whole_value() {
        let value = guarded_check();
        assert!(value == 0 || value == 1);
    }
}
