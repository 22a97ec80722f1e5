//! Diagnostic logging for the binaries.
//!
//! Everything in this crate logs through `tracing`. The binaries install a compact
//! `tracing-subscriber` formatter filtered by `RUST_LOG`:
//!
//! ```bash
//! # the walkers' traces, plus errors only (default)
//! cargo run
//!
//! # who crossed where, and when the metronome started and stopped
//! RUST_LOG=hallway=debug cargo run
//!
//! # every single tick
//! RUST_LOG=hallway=trace cargo run
//! ```
//!
//! With `RUST_LOG` unset the filter falls back to the `error` level. Diagnostics go to stderr,
//! leaving stdout to the demonstrations' own output.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Call once, at the top of `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
