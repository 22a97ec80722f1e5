//! Running a whole crossing: the metronome, one thread per walker, and the join at the end.

use std::io;
use std::sync::Arc;
use std::thread;

use crossbeam_queue::SegQueue;
use thiserror::Error;
use tracing::{debug, error, info, info_span};

use crate::cadence::{Cadence, Metronome};
use crate::config::{ConfigError, CrossingConfig};
use crate::counter::ResourceCounter;
use crate::event::CountdownEvent;
use crate::walker::{Direction, Hallway, Outcome, WalkReport, Walker};

/// Errors that stop a crossing from running to completion.
///
/// A walker giving up is not one of them; that's an [`Outcome`](../walker/enum.Outcome.html).
#[derive(Debug, Error)]
pub enum CrossingError {
    /// The configuration was rejected.
    #[error("invalid crossing configuration: {0}")]
    Config(#[from] ConfigError),
    /// The operating system refused to spawn the metronome or a walker.
    #[error("failed to spawn a thread: {0}")]
    Spawn(#[from] io::Error),
    /// A walker's thread panicked partway through its walk.
    #[error("walker {0} panicked")]
    WalkerPanicked(String),
}

/// The state of one side of the hallway after everyone has finished.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SideTally {
    /// Walkers still standing on this side, which are the ones that crossed on it.
    pub value: i32,
    /// Total claims made on this side.
    pub claims: usize,
    /// Total releases made on this side.
    pub releases: usize,
}

impl SideTally {
    fn of(counter: &ResourceCounter) -> SideTally {
        SideTally {
            value: counter.load(),
            claims: counter.claims(),
            releases: counter.releases(),
        }
    }
}

/// What happened during a crossing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossingSummary {
    /// One report per walker, in the order they finished.
    pub reports: Vec<WalkReport>,
    /// The left side at the end.
    pub left: SideTally,
    /// The right side at the end.
    pub right: SideTally,
    /// Pulses the metronome emitted while the crossing ran.
    pub ticks: u64,
}

impl CrossingSummary {
    /// Returns the tally for one side.
    pub fn side(&self, direction: Direction) -> &SideTally {
        match direction {
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }

    /// Returns how many walkers crossed on the given side.
    pub fn winners(&self, direction: Direction) -> usize {
        self.reports
            .iter()
            .filter(|r| {
                matches!(r.outcome, Outcome::Crossed { direction: d, .. } if d == direction)
            })
            .count()
    }
}

/// A configured crossing, ready to run.
///
/// # Example
///
/// ```
/// use hallway::{Crossing, CrossingConfig};
///
/// let crossing = Crossing::new(CrossingConfig::default()).unwrap();
/// let summary = crossing.run(|report| println!("{}", report.trace)).unwrap();
///
/// assert_eq!(summary.reports.len(), 2);
/// for report in &summary.reports {
///     assert!(report.attempts <= 5);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Crossing {
    config: CrossingConfig,
}

impl Crossing {
    /// Validates `config` and wraps it up.
    pub fn new(config: CrossingConfig) -> Result<Crossing, ConfigError> {
        config.validate()?;
        Ok(Crossing { config })
    }

    /// Returns the configuration this crossing runs with.
    pub fn config(&self) -> &CrossingConfig {
        &self.config
    }

    /// Runs the crossing to completion.
    ///
    /// Every walker gets its own named thread. When a walker finishes, `on_finish` is called on
    /// that walker's thread with its report, exactly once per walker, in whatever order they
    /// happen to finish. This call returns once every walker has arrived at the finish line and
    /// the metronome has been stopped.
    ///
    /// # Errors
    ///
    /// Returns `CrossingError::Spawn` if a thread can't be started, and
    /// `CrossingError::WalkerPanicked` if a walker (or `on_finish`) panics.
    pub fn run<F>(&self, on_finish: F) -> Result<CrossingSummary, CrossingError>
    where
        F: Fn(&WalkReport) + Sync,
    {
        let _span = info_span!("crossing", walkers = self.config.walkers.len()).entered();

        let cadence = Arc::new(Cadence::new());
        // outlives the scope below, so walkers already spawned can finish if a later spawn fails
        let metronome = Metronome::start(cadence.clone(), self.config.tick)?;
        let hallway = Hallway::new(cadence);
        let in_hallway = CountdownEvent::new(self.config.walkers.len());
        let finished = SegQueue::new();

        let panicked = thread::scope(|s| -> Result<Vec<String>, CrossingError> {
            let mut handles = Vec::with_capacity(self.config.walkers.len());

            for name in &self.config.walkers {
                let walker = Walker::new(name.as_str(), self.config.max_attempts);
                let (hallway, in_hallway, finished, on_finish) =
                    (&hallway, &in_hallway, &finished, &on_finish);

                let handle = thread::Builder::new()
                    .name(name.clone())
                    .spawn_scoped(s, move || {
                        let _arrival = in_hallway.arrival();
                        let _span = info_span!("walker", walker = walker.name()).entered();

                        let report = walker.walk(hallway);
                        on_finish(&report);
                        finished.push(report);
                    })?;

                debug!(walker = %name, "entered the hallway");
                handles.push((name, handle));
            }

            in_hallway.wait();

            Ok(handles
                .into_iter()
                .filter_map(|(name, handle)| handle.join().err().map(|_| name.clone()))
                .collect())
        })?;

        let ticks = metronome.stop();

        if let Some(name) = panicked.into_iter().next() {
            error!(walker = %name, "walker panicked");
            return Err(CrossingError::WalkerPanicked(name));
        }

        let mut reports = Vec::with_capacity(self.config.walkers.len());
        while let Some(report) = finished.pop() {
            reports.push(report);
        }

        let summary = CrossingSummary {
            reports,
            left: SideTally::of(hallway.side(Direction::Left)),
            right: SideTally::of(hallway.side(Direction::Right)),
            ticks,
        };

        info!(
            crossed = summary.reports.iter().filter(|r| r.crossed()).count(),
            ticks, "everyone is out of the hallway"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::{Crossing, CrossingError};
    use crate::config::{ConfigError, CrossingConfig};
    use crate::walker::Direction;
    use std::sync::Mutex;

    #[test]
    fn invalid_config_is_refused_up_front() {
        let mut config = CrossingConfig::default();
        config.walkers.clear();
        assert_eq!(Crossing::new(config).unwrap_err(), ConfigError::NoWalkers);
    }

    #[test]
    fn on_finish_sees_every_walker_once() {
        let crossing = Crossing::new(CrossingConfig::default()).unwrap();
        let seen = Mutex::new(Vec::new());

        let summary = crossing
            .run(|report| seen.lock().unwrap().push(report.name.clone()))
            .unwrap();

        let mut seen = seen.into_inner().unwrap();
        seen.sort();
        assert_eq!(seen, ["Alice", "Barbara"]);

        let mut names: Vec<_> = summary.reports.iter().map(|r| r.name.as_str()).collect();
        names.sort();
        assert_eq!(names, ["Alice", "Barbara"]);
    }

    #[test]
    fn lone_walker_crosses_left_immediately() {
        let config = CrossingConfig {
            walkers: vec!["Alice".to_string()],
            ..CrossingConfig::default()
        };
        let summary = Crossing::new(config).unwrap().run(|_| {}).unwrap();

        assert_eq!(summary.winners(Direction::Left), 1);
        assert_eq!(summary.left.value, 1);
        assert_eq!(summary.right.claims, 0);
        assert!(summary.ticks >= 1);
    }

    #[test]
    fn a_panicking_walker_does_not_hang_the_join() {
        let crossing = Crossing::new(CrossingConfig::default()).unwrap();

        let result = crossing.run(|report| {
            if report.name == "Barbara" {
                panic!("Barbara tripped");
            }
        });

        match result {
            Err(CrossingError::WalkerPanicked(name)) => assert_eq!(name, "Barbara"),
            other => panic!("expected a panicked walker, got {:?}", other),
        }
    }
}
