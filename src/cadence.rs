//! A broadcast "heartbeat" that lets threads advance in lockstep.
//!
//! The primary types in this module are [`Cadence`], which parks any number of threads until the
//! next pulse, and [`Metronome`], which pulses a `Cadence` on a fixed period from a background
//! thread.
//!
//! [`Cadence`]: struct.Cadence.html
//! [`Metronome`]: struct.Metronome.html

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_queue::SegQueue;
use tracing::{debug, trace, warn};

/// A synchronization primitive that wakes every waiting thread at once when it is pulsed.
///
/// A `Cadence` behaves like a condition variable that is only ever broadcast: calling `wait`
/// parks the current thread until the *next* call to `pulse`, and `pulse` resumes every thread
/// that is waiting at that moment. Pulses carry no payload and are never stored up. A thread that
/// starts waiting just after a pulse sleeps until the one after it, no matter how many pulses
/// happened before it arrived.
///
/// Internally the cadence keeps a generation number. A waiter records the generation when it
/// starts waiting and returns as soon as it observes a different one, so spurious wakeups from
/// `thread::park` are harmless.
///
/// # Example
///
/// ```
/// use hallway::Cadence;
/// use std::sync::Arc;
/// use std::thread;
/// use std::time::Duration;
///
/// let cadence = Arc::new(Cadence::new());
/// let waiter = {
///     let cadence = cadence.clone();
///     thread::spawn(move || cadence.wait())
/// };
///
/// // keep pulsing until the waiter has definitely gone through one
/// while !waiter.is_finished() {
///     cadence.pulse();
///     thread::sleep(Duration::from_millis(1));
/// }
///
/// waiter.join().unwrap();
/// ```
pub struct Cadence {
    generation: AtomicU64,
    waiting: SegQueue<thread::Thread>,
}

impl Cadence {
    /// Creates a new `Cadence` with nobody waiting on it.
    pub fn new() -> Cadence {
        Cadence {
            generation: AtomicU64::new(0),
            waiting: SegQueue::new(),
        }
    }

    /// Returns how many times this `Cadence` has been pulsed.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Wakes every thread currently blocked in `wait`, returning the number of park handles that
    /// were drained.
    ///
    /// The returned count can be larger than the number of distinct waiters, since a waiter that
    /// woke up spuriously re-registers itself.
    pub fn pulse(&self) -> usize {
        self.generation.fetch_add(1, Ordering::SeqCst);

        let mut woken = 0;
        while let Some(thread) = self.waiting.pop() {
            thread.unpark();
            woken += 1;
        }

        woken
    }

    /// Blocks the current thread until the next call to `pulse`.
    pub fn wait(&self) {
        let seen = self.generation();

        loop {
            // Push before checking the generation. If a pulse lands between the check and the
            // push, it would drain the queue without us in it; pushing first means that pulse
            // either unparks us or has already bumped the generation we are about to read.
            // A pulse can also pop a handle that belongs to a previous wakeup of ours, which is
            // why the push happens on every pass and not just the first.
            self.waiting.push(thread::current());

            if self.generation() != seen {
                return;
            }

            thread::park();

            if self.generation() != seen {
                return;
            }
        }
    }
}

impl Default for Cadence {
    fn default() -> Cadence {
        Cadence::new()
    }
}

impl fmt::Debug for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cadence")
            .field("generation", &self.generation())
            .finish()
    }
}

/// A background thread that pulses a [`Cadence`] on a fixed period.
///
/// The metronome schedules its pulses against deadlines rather than sleeping a fixed amount
/// after each one, so the time spent waking waiters does not stretch the period. If it ever
/// falls more than a full period behind (say, the machine was suspended) it skips the missed
/// ticks instead of firing them in a burst.
///
/// The thread runs until `stop` is called or the `Metronome` is dropped.
///
/// [`Cadence`]: struct.Cadence.html
///
/// # Example
///
/// ```
/// use hallway::{Cadence, Metronome};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let cadence = Arc::new(Cadence::new());
/// let metronome = Metronome::start(cadence.clone(), Duration::from_millis(1)).unwrap();
///
/// cadence.wait();
/// cadence.wait();
///
/// assert!(metronome.stop() >= 2);
/// ```
pub struct Metronome {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<u64>>,
}

impl Metronome {
    /// Spawns a thread named `metronome` that pulses `cadence` every `period`.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if the operating system refuses to spawn the thread.
    pub fn start(cadence: Arc<Cadence>, period: Duration) -> io::Result<Metronome> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();

        let handle = thread::Builder::new()
            .name("metronome".to_string())
            .spawn(move || beat(&cadence, period, &flag))?;

        debug!(period_us = period.as_micros() as u64, "metronome started");

        Ok(Metronome {
            stop,
            handle: Some(handle),
        })
    }

    /// Stops the metronome and waits for its thread to exit, returning the number of pulses it
    /// emitted.
    pub fn stop(mut self) -> u64 {
        self.shutdown()
    }

    fn shutdown(&mut self) -> u64 {
        let handle = match self.handle.take() {
            Some(handle) => handle,
            None => return 0,
        };

        self.stop.store(true, Ordering::Release);
        handle.thread().unpark();

        match handle.join() {
            Ok(ticks) => {
                debug!(ticks, "metronome stopped");
                ticks
            }
            Err(_) => {
                warn!("metronome thread panicked");
                0
            }
        }
    }
}

impl Drop for Metronome {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn beat(cadence: &Cadence, period: Duration, stop: &AtomicBool) -> u64 {
    let mut ticks = 0;
    let mut next = Instant::now() + period;

    while !stop.load(Ordering::Acquire) {
        let now = Instant::now();
        if now < next {
            // woken early either by `stop` or spuriously; both re-check at the top
            thread::park_timeout(next - now);
            continue;
        }

        let woken = cadence.pulse();
        ticks += 1;
        trace!(ticks, woken, "tick");

        next += period;
        if next <= now {
            next = now + period;
        }
    }

    ticks
}

#[cfg(test)]
mod tests {
    use super::{Cadence, Metronome};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn pulse_without_waiters_is_not_remembered() {
        let cadence = Cadence::new();
        assert_eq!(cadence.pulse(), 0);
        assert_eq!(cadence.generation(), 1);

        // a stale pulse must not let a later waiter through
        let cadence = Arc::new(cadence);
        let passed = Arc::new(AtomicUsize::new(0));
        let waiter = {
            let cadence = cadence.clone();
            let passed = passed.clone();
            thread::spawn(move || {
                cadence.wait();
                passed.fetch_add(1, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(passed.load(Ordering::SeqCst), 0);

        while !waiter.is_finished() {
            cadence.pulse();
            thread::sleep(Duration::from_millis(1));
        }
        waiter.join().unwrap();
        assert_eq!(passed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn one_pulse_wakes_every_waiter() {
        let cadence = Arc::new(Cadence::new());
        let parked = Arc::new(AtomicUsize::new(0));

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let cadence = cadence.clone();
                let parked = parked.clone();
                thread::spawn(move || {
                    let before = cadence.generation();
                    parked.fetch_add(1, Ordering::SeqCst);
                    cadence.wait();
                    cadence.generation() - before
                })
            })
            .collect();

        while parked.load(Ordering::SeqCst) < 4 {
            thread::yield_now();
        }
        // give them a moment to actually reach `park`
        thread::sleep(Duration::from_millis(50));

        cadence.pulse();

        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), 1);
        }
    }

    #[test]
    fn metronome_keeps_waking_waiters() {
        let cadence = Arc::new(Cadence::new());
        let metronome = Metronome::start(cadence.clone(), Duration::from_millis(1)).unwrap();

        for _ in 0..10 {
            cadence.wait();
        }

        assert!(metronome.stop() >= 10);
    }

    #[test]
    fn stop_does_not_wait_out_a_long_period() {
        let cadence = Arc::new(Cadence::new());
        let metronome = Metronome::start(cadence, Duration::from_secs(60)).unwrap();

        let begin = Instant::now();
        assert_eq!(metronome.stop(), 0);
        assert!(begin.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn dropping_the_metronome_stops_the_pulses() {
        let cadence = Arc::new(Cadence::new());
        {
            let _metronome = Metronome::start(cadence.clone(), Duration::from_millis(1)).unwrap();
            cadence.wait();
        }

        let after_drop = cadence.generation();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(cadence.generation(), after_drop);
    }
}
