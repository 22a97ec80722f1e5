//! Memory access synchronization: the race again, with a lock around every access.

use hallway::demos::mutex;
use hallway::telemetry::setup_tracing;

fn main() {
    setup_tracing();

    match mutex::guarded_check() {
        0 => println!("The value is 0"),
        value => println!("The value is {}", value),
    }

    let report = mutex::guarded_updates(4, 100_000);
    println!(
        "{} increments, {} survived, {} lost",
        report.expected,
        report.observed,
        report.lost()
    );
}
