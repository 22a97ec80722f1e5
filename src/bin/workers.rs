//! Ten workers take a nap; the main thread waits for all of them.

use std::io;
use std::time::Duration;

use hallway::demos::workers::{self, WorkerEvent};
use hallway::telemetry::setup_tracing;

fn main() -> io::Result<()> {
    setup_tracing();

    workers::run(10, Duration::from_secs(2), |event| match event {
        WorkerEvent::Started(n) => println!("Started {}", n),
        WorkerEvent::Finished(_) => println!("Finished"),
    })
}
