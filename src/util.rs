//! Some utility functions that don't need to be part of the public release.

use std::sync::LockResult;

// Unwrap a LockResult to get the guard even when poisoned.
//
// The demos panic on purpose in a few places, but a poisoned lock still holds perfectly good
// numbers, so take them.
//
// Source for the name: http://bulbapedia.bulbagarden.net/wiki/Guts_(Ability)
pub fn guts<T>(res: LockResult<T>) -> T {
    match res {
        Ok(guard) => guard,
        // The Pokemon's Guts raises its Attack!
        Err(poison) => poison.into_inner(),
    }
}
