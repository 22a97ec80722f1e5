//! A race condition: two operations that must happen in order, with nothing enforcing it.

use std::time::Duration;

use hallway::demos::race::{self, Observation};
use hallway::telemetry::setup_tracing;

fn main() {
    setup_tracing();

    match race::check_then_act(Duration::from_secs(1)) {
        Observation::Before => println!("the value is 0"),
        Observation::After => println!("the value is 1"),
    }

    let report = race::lost_updates(4, 100_000);
    println!(
        "{} increments, {} survived, {} lost",
        report.expected,
        report.observed,
        report.lost()
    );
}
