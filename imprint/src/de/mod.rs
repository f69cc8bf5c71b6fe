//! The deserialization-side context and traversal.

mod context;

pub use context::Tracker;

use crate::error::Error;
use crate::mode::Mode;
use crate::traits::Fallible;

/// The deserializer-side API a `Deserialize` impl walks through.
///
/// Carries the deserialization context (`base`, `size`, `check`) plus the
/// active [`Mode`] and the visited-slot set that makes walking a cyclic
/// archived graph terminate.
pub trait Deserializer: Fallible<Error = Error> {
    /// The mode this pass is validating against.
    fn mode(&self) -> Mode;

    /// Bounds- and alignment-checks a resolved pointer `ptr..ptr+size`
    /// against the buffer, unless [`Mode::UNCHECKED`] is set (in which
    /// case this always succeeds without inspecting `ptr`).
    fn check(&self, ptr: *const u8, size: usize, align: usize) -> Result<(), Error>;

    /// Records that the slot at `slot_addr` has been visited during this
    /// pass. Returns `true` if this is the first visit (the caller should
    /// recurse into it), `false` if it was already visited (the caller
    /// must stop, since the referent is part of a cycle already being
    /// walked).
    fn mark_visited(&mut self, slot_addr: usize) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_accessible_on_trait_object() {
        let ctx = Tracker::new(core::ptr::null(), 0, Mode::NONE);
        assert_eq!(ctx.mode(), Mode::NONE);
    }
}
