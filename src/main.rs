//! Alice and Barbara try to get past each other in a hallway.
//!
//! Each walker prints the story of their attempts once they're through or have given up.

use std::process::ExitCode;

use hallway::telemetry::setup_tracing;
use hallway::{Crossing, CrossingConfig, CrossingError};
use tracing::error;

fn run() -> Result<(), CrossingError> {
    let crossing = Crossing::new(CrossingConfig::from_env_or_default())?;
    crossing.run(|report| println!("{}", report.trace))?;
    Ok(())
}

fn main() -> ExitCode {
    setup_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "crossing failed");
            ExitCode::FAILURE
        }
    }
}
