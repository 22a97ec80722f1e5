//! Shared claim counters for the hallway.

use std::fmt;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

/// An integer that counts how many parties currently claim a resource.
///
/// Every operation is a single atomic instruction, so no lock is involved. A party registers
/// interest with `claim`, inspects with `load`, and backs off with `release`. If `load` returns
/// exactly 1 right after a party's own `claim`, that party is the only claimant.
///
/// Alongside the live value the counter keeps running tallies of claims and releases, which makes
/// it possible to check after the fact that every claim that lost was paired with a release.
///
/// ```
/// use hallway::ResourceCounter;
///
/// let left = ResourceCounter::new();
/// assert_eq!(left.claim(), 1);
/// assert_eq!(left.claim(), 2);
/// assert_eq!(left.release(), 1);
///
/// assert_eq!(left.load(), 1);
/// assert_eq!(left.claims() - left.releases(), 1);
/// ```
#[derive(Default)]
pub struct ResourceCounter {
    value: AtomicI32,
    claims: AtomicUsize,
    releases: AtomicUsize,
}

impl ResourceCounter {
    /// Creates a counter with nobody claiming it.
    pub fn new() -> ResourceCounter {
        ResourceCounter::default()
    }

    /// Atomically registers interest, returning the value after the increment.
    pub fn claim(&self) -> i32 {
        self.claims.fetch_add(1, Ordering::SeqCst);
        self.value.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Atomically withdraws interest, returning the value after the decrement.
    pub fn release(&self) -> i32 {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.value.fetch_sub(1, Ordering::SeqCst) - 1
    }

    /// Returns the current number of claimants.
    pub fn load(&self) -> i32 {
        self.value.load(Ordering::SeqCst)
    }

    /// Returns how many times `claim` has been called.
    pub fn claims(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }

    /// Returns how many times `release` has been called.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for ResourceCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCounter")
            .field("value", &self.load())
            .field("claims", &self.claims())
            .field("releases", &self.releases())
            .finish()
    }
}
