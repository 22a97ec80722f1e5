use std::sync::Mutex;
use std::time::Duration;

use hallway::{Crossing, CrossingConfig, CrossingSummary, Direction, Outcome};

fn crossing(max_attempts: usize) -> CrossingSummary {
    let config = CrossingConfig {
        max_attempts,
        ..CrossingConfig::default()
    };

    Crossing::new(config).unwrap().run(|_| {}).unwrap()
}

#[test]
fn walkers_never_exceed_their_attempts() {
    for _ in 0..20 {
        let summary = crossing(5);
        assert_eq!(summary.reports.len(), 2);

        for report in &summary.reports {
            assert!(report.attempts >= 1 && report.attempts <= 5);

            match report.outcome {
                Outcome::Crossed { attempt, .. } => assert_eq!(attempt, report.attempts),
                Outcome::GaveUp => {
                    assert_eq!(report.attempts, 5);
                    assert!(report.trace.ends_with("tosses up their hands in exasperation!"));
                }
            }
        }
    }
}

#[test]
fn every_losing_claim_is_released() {
    for _ in 0..20 {
        let summary = crossing(5);

        for direction in Direction::ALL {
            let side = summary.side(direction);
            assert_eq!(side.value as usize, summary.winners(direction));
            assert_eq!(side.claims - side.releases, summary.winners(direction));
            assert!(side.value == 0 || side.value == 1);
        }
    }
}

#[test]
fn traces_read_like_the_walk() {
    let summary = crossing(5);

    for report in &summary.reports {
        let header = format!("{} is trying to scoot:", report.name);
        assert!(report.trace.starts_with(&header));

        let steps = report.trace[header.len()..].lines().next().unwrap_or("");
        let tried = steps.matches("left").count() + steps.matches("right").count();

        match report.outcome {
            Outcome::Crossed { direction, .. } => {
                assert!(steps.ends_with(&format!("{}. Success", direction)));
                assert_eq!(steps.matches("Success").count(), 1);
                assert!(tried <= 2 * report.attempts);
            }
            Outcome::GaveUp => {
                assert!(!steps.contains("Success"));
                assert_eq!(tried, 2 * report.attempts);
            }
        }
    }
}

#[test]
fn each_trace_is_handed_over_exactly_once() {
    let printed = Mutex::new(Vec::new());
    let summary = Crossing::new(CrossingConfig::default())
        .unwrap()
        .run(|report| printed.lock().unwrap().push(report.trace.clone()))
        .unwrap();

    let mut printed = printed.into_inner().unwrap();
    let mut traces: Vec<_> = summary.reports.into_iter().map(|r| r.trace).collect();
    printed.sort();
    traces.sort();
    assert_eq!(printed, traces);
}

#[test]
fn a_slow_cadence_still_terminates() {
    let config = CrossingConfig {
        tick: Duration::from_millis(5),
        max_attempts: 2,
        walkers: vec!["Alice".into(), "Barbara".into(), "Carol".into()],
    };

    let summary = Crossing::new(config).unwrap().run(|_| {}).unwrap();
    assert_eq!(summary.reports.len(), 3);
    assert!(summary.ticks >= 1);
}
