//! A pool of workers that each take a nap, joined with a countdown.

use std::io;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::event::CountdownEvent;

/// Something a worker did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    /// Worker `n` started its nap.
    Started(usize),
    /// Worker `n` woke up.
    Finished(usize),
}

/// Spawns `workers` threads that each report `Started`, sleep for `nap`, and report `Finished`,
/// then waits for all of them.
///
/// `on_event` is called from the workers' threads as things happen.
///
/// # Errors
///
/// Returns the underlying error if a worker can't be spawned. Workers that did get spawned are
/// still waited for first.
pub fn run<F>(workers: usize, nap: Duration, on_event: F) -> io::Result<()>
where
    F: Fn(WorkerEvent) + Sync,
{
    let pool = CountdownEvent::new(workers);

    thread::scope(|s| -> io::Result<()> {
        for n in 0..workers {
            let (pool, on_event) = (&pool, &on_event);

            // on failure the scope still joins whoever did start
            thread::Builder::new()
                .name(format!("worker-{}", n))
                .spawn_scoped(s, move || {
                    let _arrival = pool.arrival();
                    on_event(WorkerEvent::Started(n));
                    thread::sleep(nap);
                    on_event(WorkerEvent::Finished(n));
                })?;
        }

        pool.wait();
        debug!(workers, "every worker has finished");
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::{run, WorkerEvent};
    use std::sync::Mutex;
    use std::time::Duration;

    #[test]
    fn every_worker_starts_before_it_finishes() {
        let events = Mutex::new(Vec::new());

        run(10, Duration::from_millis(20), |event| {
            events.lock().unwrap().push(event)
        })
        .unwrap();

        let events = events.into_inner().unwrap();
        assert_eq!(events.len(), 20);

        for n in 0..10 {
            let started = events.iter().position(|e| *e == WorkerEvent::Started(n));
            let finished = events.iter().position(|e| *e == WorkerEvent::Finished(n));
            assert!(started.unwrap() < finished.unwrap());
        }
    }

    #[test]
    fn an_empty_pool_returns_immediately() {
        run(0, Duration::from_secs(60), |_| panic!("nobody should be working")).unwrap();
    }
}
