//! Two routines taking the same two locks in opposite order, and then in the same order.

use std::io;
use std::time::Duration;

use hallway::demos::deadlock::{self, DeadlockOutcome, LockOrder};
use hallway::telemetry::setup_tracing;

fn main() -> io::Result<()> {
    setup_tracing();

    for order in [LockOrder::Opposing, LockOrder::Consistent] {
        match deadlock::run(order, Duration::from_millis(100), Duration::from_secs(2))? {
            DeadlockOutcome::Completed(sums) => {
                for sum in sums {
                    println!("{:?}: sum={}", order, sum);
                }
            }
            DeadlockOutcome::Deadlocked(stuck) => {
                println!("{:?}: deadlock, {} routines still waiting", order, stuck);
            }
        }
    }

    Ok(())
}
