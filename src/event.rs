//! "Event" primitives, allowing one thread to wait on a countdown from other threads.
//!
//! The primary type in this module is the [`CountdownEvent`] struct. See the documentation on
//! that type for further information.
//!
//! [`CountdownEvent`]: struct.CountdownEvent.html

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_queue::SegQueue;
use thiserror::Error;
use tracing::trace;

/// A synchronization primitive that signals when its count reaches zero.
///
/// With a `CountdownEvent`, it's possible to cause one thread to wait on a set of computations
/// occurring in other threads by making the other threads signal the counter as they finish their
/// work. It plays the same role as a "wait group": the count is fixed up front to the number of
/// participants, each participant signals once, and the waiter resumes when the last one does.
///
/// Once its counter reaches zero (even by starting there), any further attempt to signal it will
/// return `CountdownError::AlreadySet`.
///
/// # Example
///
/// This example uses a `CountdownEvent` to make the "coordinator" thread sleep until all of its
/// "worker" threads have finished. Each worker holds an [`Arrival`] that signals the event when
/// it is dropped, so the signal happens exactly once even if the worker panics.
///
/// ```
/// use hallway::CountdownEvent;
/// use std::sync::Arc;
/// use std::thread;
/// use std::time::Duration;
///
/// let thread_count = 5;
/// let counter = Arc::new(CountdownEvent::new(thread_count));
///
/// for i in 0..thread_count {
///     let signal = counter.clone();
///     thread::spawn(move || {
///         let _arrival = signal.arrival();
///         thread::sleep(Duration::from_millis(i as u64));
///         println!("thread {} activated!", i);
///     });
/// }
///
/// counter.wait();
/// assert_eq!(counter.count(), 0);
/// ```
///
/// [`Arrival`]: struct.Arrival.html
pub struct CountdownEvent {
    counter: AtomicUsize,
    waiting: SegQueue<thread::Thread>,
}

/// The collection of errors that can be returned by [`CountdownEvent`] methods.
///
/// [`CountdownEvent`]: struct.CountdownEvent.html
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum CountdownError {
    /// Returned when attempting to signal would have caused the counter to go below zero.
    #[error("signal of {requested} exceeds remaining count of {remaining}")]
    TooManySignals {
        /// The amount the caller tried to subtract.
        requested: usize,
        /// The count at the time of the attempt.
        remaining: usize,
    },
    /// Returned when attempting to signal the counter after it has reached zero.
    #[error("countdown has already reached zero")]
    AlreadySet,
}

impl CountdownEvent {
    /// Creates a new `CountdownEvent`, initialized to the given count.
    ///
    /// Passing zero creates an event that is permanently signaled.
    pub fn new(count: usize) -> CountdownEvent {
        CountdownEvent {
            counter: AtomicUsize::new(count),
            waiting: SegQueue::new(),
        }
    }

    /// Returns the current counter value.
    pub fn count(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }

    /// Subtracts the given count from the counter, and returns whether this caused waiting
    /// threads to wake up.
    ///
    /// # Errors
    ///
    /// If the counter is already at zero, this function will return `CountdownError::AlreadySet`.
    ///
    /// If the given count would cause the counter to go *below* zero (instead of reaching zero),
    /// this function will return `CountdownError::TooManySignals`.
    pub fn signal(&self, count: usize) -> Result<bool, CountdownError> {
        let mut current = self.count();

        let remaining = loop {
            if current == 0 {
                return Err(CountdownError::AlreadySet);
            }

            let new_count = current.checked_sub(count).ok_or(CountdownError::TooManySignals {
                requested: count,
                remaining: current,
            })?;

            match self.counter.compare_exchange(
                current,
                new_count,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => break new_count,
                Err(actual) => current = actual,
            }
        };

        trace!(remaining, "countdown signaled");

        if remaining == 0 {
            while let Some(thread) = self.waiting.pop() {
                thread.unpark();
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Subtracts one from the counter, and returns whether this caused waiting threads to wake
    /// up.
    ///
    /// # Errors
    ///
    /// See [`signal`] for the situations where this function will return an error.
    ///
    /// [`signal`]: #method.signal
    pub fn decrement(&self) -> Result<bool, CountdownError> {
        self.signal(1)
    }

    /// Returns a guard object that will decrement the counter once, when it is dropped.
    ///
    /// Holding an `Arrival` for the lifetime of a participant's work ties the signal to scope
    /// exit, so it fires on every path out of that scope, unwinding included.
    pub fn arrival(&self) -> Arrival<'_> {
        Arrival { event: self }
    }

    /// Blocks the current thread until the counter reaches zero.
    ///
    /// This function will block indefinitely until the counter reaches zero. It will return
    /// immediately if it is already at zero.
    pub fn wait(&self) {
        // Push before the first check, for the same reason `Cadence::wait` does: a signal that
        // lands between our check and our push would otherwise drain the queue without us.
        loop {
            self.waiting.push(thread::current());

            if self.count() == 0 {
                return;
            }

            thread::park();
        }
    }

    /// Blocks the current thread until the counter reaches zero, or until the given timeout
    /// elapses, returning the count at the time of wakeup.
    ///
    /// A return value of zero means every participant arrived; anything else means the timeout
    /// won.
    pub fn wait_timeout(&self, timeout: Duration) -> usize {
        let begin = Instant::now();

        loop {
            self.waiting.push(thread::current());

            let current = self.count();
            if current == 0 {
                return 0;
            }

            let elapsed = begin.elapsed();
            if elapsed >= timeout {
                return current;
            }

            thread::park_timeout(timeout - elapsed);
        }
    }
}

/// An opaque guard struct that decrements the count of a borrowed `CountdownEvent` on drop.
///
/// See [`CountdownEvent::arrival`] for more information about this struct.
///
/// [`CountdownEvent::arrival`]: struct.CountdownEvent.html#method.arrival
pub struct Arrival<'a> {
    event: &'a CountdownEvent,
}

/// Upon drop, this guard will decrement the counter of its parent `CountdownEvent`. If this would
/// cause an error (see [`CountdownEvent::signal`] for details), the error is silently ignored.
///
/// [`CountdownEvent::signal`]: struct.CountdownEvent.html#method.signal
impl<'a> Drop for Arrival<'a> {
    fn drop(&mut self) {
        // an error here means somebody over-signaled by hand; the event is set either way
        self.event.decrement().ok();
    }
}
