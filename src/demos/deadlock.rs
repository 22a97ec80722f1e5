//! Deadlock: two routines that each need two locks, taking them in opposite order.
//!
//! Both routines sum the same pair of lock-protected values. Each locks its first value, pauses,
//! then reaches for the second, which the other routine is holding. Neither lets go, so neither
//! finishes. Taking the locks in one agreed-upon order removes the cycle.
//!
//! Deadlocked threads can't be rescued, so `run` gives up on them after a timeout and leaves them
//! parked in the background. That's fine for a demo binary that's about to exit.

use std::io;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam_queue::SegQueue;
use tracing::{debug, warn};

use crate::event::CountdownEvent;
use crate::util;

/// The order in which each routine takes its two locks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LockOrder {
    /// Each routine locks its own first argument first, so the two routines lock in opposite
    /// orders. Both routines also wait for each other to hold their first lock before going for
    /// the second, which makes the deadlock certain instead of merely likely.
    Opposing,
    /// Both routines lock the lower-ranked value first, whatever order they were handed them in.
    Consistent,
}

/// How a deadlock demonstration ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeadlockOutcome {
    /// Both routines finished. Holds each routine's sum, in completion order.
    Completed(Vec<i32>),
    /// The patience ran out with this many routines still stuck.
    Deadlocked(usize),
}

struct Value {
    rank: usize,
    value: Mutex<i32>,
}

/// Runs two summing routines over the values 1 and 2, one as `sum(a, b)` and the other as
/// `sum(b, a)`.
///
/// `hold` is how long a routine sits on its first lock before reaching for the second, and
/// `patience` is how long to wait for both routines before declaring them deadlocked.
///
/// # Errors
///
/// Returns the underlying error if a routine's thread can't be spawned.
pub fn run(order: LockOrder, hold: Duration, patience: Duration) -> io::Result<DeadlockOutcome> {
    let a = Arc::new(Value {
        rank: 0,
        value: Mutex::new(1),
    });
    let b = Arc::new(Value {
        rank: 1,
        value: Mutex::new(2),
    });

    let done = Arc::new(CountdownEvent::new(2));
    let sums = Arc::new(SegQueue::new());
    let rendezvous = match order {
        LockOrder::Opposing => Some(Arc::new(Barrier::new(2))),
        LockOrder::Consistent => None,
    };

    for (i, (v1, v2)) in [(a.clone(), b.clone()), (b, a)].into_iter().enumerate() {
        let done = done.clone();
        let sums = sums.clone();
        let rendezvous = rendezvous.clone();

        thread::Builder::new()
            .name(format!("print-sum-{}", i))
            .spawn(move || {
                let _arrival = done.arrival();
                let total = sum(&v1, &v2, order, hold, rendezvous.as_deref());
                debug!(total, "routine finished");
                sums.push(total);
            })?;
    }

    let stuck = done.wait_timeout(patience);
    if stuck > 0 {
        warn!(stuck, "routines are waiting on each other's locks");
        return Ok(DeadlockOutcome::Deadlocked(stuck));
    }

    let mut totals = Vec::with_capacity(2);
    while let Some(total) = sums.pop() {
        totals.push(total);
    }
    Ok(DeadlockOutcome::Completed(totals))
}

fn sum(
    v1: &Value,
    v2: &Value,
    order: LockOrder,
    hold: Duration,
    rendezvous: Option<&Barrier>,
) -> i32 {
    let (outer, inner) = match order {
        LockOrder::Opposing => (v1, v2),
        LockOrder::Consistent if v1.rank <= v2.rank => (v1, v2),
        LockOrder::Consistent => (v2, v1),
    };

    let outer_value = util::guts(outer.value.lock());
    debug!(rank = outer.rank, "holding first lock");

    if let Some(rendezvous) = rendezvous {
        rendezvous.wait();
    }
    thread::sleep(hold);

    let inner_value = util::guts(inner.value.lock());
    debug!(rank = inner.rank, "holding second lock");

    *outer_value + *inner_value
}

#[cfg(test)]
mod tests {
    use super::{run, DeadlockOutcome, LockOrder};
    use std::time::Duration;

    #[test]
    fn opposing_lock_order_deadlocks() {
        let outcome = run(
            LockOrder::Opposing,
            Duration::from_millis(10),
            Duration::from_millis(500),
        )
        .unwrap();
        assert_eq!(outcome, DeadlockOutcome::Deadlocked(2));
    }

    #[test]
    fn consistent_lock_order_finishes() {
        let outcome = run(
            LockOrder::Consistent,
            Duration::from_millis(10),
            Duration::from_secs(30),
        )
        .unwrap();
        assert_eq!(outcome, DeadlockOutcome::Completed(vec![3, 3]));
    }
}
