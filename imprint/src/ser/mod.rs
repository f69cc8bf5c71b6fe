//! Graph traversal and emission: the serializer side of the engine.
//!
//! Rather than a two-phase `serialize` (build a `Resolver` now, later
//! consumed by a separate `resolve` call that writes bytes), this engine
//! writes in one direct pass. The reason is ordering: the root (and
//! every aggregate) must be written to the buffer *before* its children,
//! with forward references patched afterwards via a pending queue, so
//! that the root always lands at a fixed low buffer offset (0, or 8 with
//! a version header). A resolver split supports a bottom-up layout where
//! a parent's position is only known after its children are already
//! written; that layout cannot put the root at a fixed low offset.
//! Collapsing `serialize`/`resolve` into `reserve` + `serialize_into`
//! keeps the same vocabulary (`Serializer`, `Serialize`) while matching
//! the required layout.

mod context;

pub use context::Tracker;

use crate::error::Error;
use crate::traits::Fallible;

/// The serializer-side API a `Serialize` impl writes through.
///
/// Provides the basic buffer primitives (`pos`/`write`/`pad`/`align`)
/// plus the operations a full traversal needs: reserving a zeroed,
/// aligned slot up front (`reserve`), patching an already-written slot
/// (`overwrite`), and the visited/pending/owned bookkeeping a
/// context implementation maintains.
pub trait Serializer: Fallible<Error = Error> {
    /// The current length of the buffer, i.e. the position the next
    /// written byte will land at.
    fn pos(&self) -> usize;

    /// Appends `bytes` to the end of the buffer.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error>;

    /// Appends `count` zero bytes to the end of the buffer.
    fn pad(&mut self, count: usize) -> Result<(), Error>;

    /// Aligns the current position up to `align` (a power of two) by
    /// appending zero padding, returning the (now-aligned) position.
    fn align(&mut self, align: usize) -> Result<usize, Error> {
        debug_assert!(align.is_power_of_two());
        let offset = self.pos() & (align - 1);
        if offset != 0 {
            self.pad(align - offset)?;
        }
        Ok(self.pos())
    }

    /// Aligns for `T`, then reserves `core::mem::size_of::<T>()` zeroed
    /// bytes, returning the position the reservation starts at.
    fn reserve<T>(&mut self) -> Result<usize, Error> {
        self.reserve_bytes(core::mem::align_of::<T>(), core::mem::size_of::<T>())
    }

    /// Aligns to `align`, then reserves `size` zeroed bytes, returning
    /// the position the reservation starts at.
    fn reserve_bytes(&mut self, align: usize, size: usize) -> Result<usize, Error> {
        let pos = self.align(align)?;
        self.pad(size)?;
        Ok(pos)
    }

    /// Overwrites `bytes.len()` already-written bytes starting at
    /// `offset`. Used to patch a placeholder reserved earlier with its
    /// final value, and to drain the pending-patch queue.
    fn overwrite(&mut self, offset: usize, bytes: &[u8]) -> Result<(), Error>;

    /// Looks up the buffer offset a previously-emitted source address was
    /// written at.
    fn visited(&self, addr: usize) -> Option<usize>;

    /// Records that the object at `addr` was emitted at `pos`. Must be
    /// called *before* recursing into `addr`'s own fields, so that a
    /// cyclic reference discovered during that recursion resolves as an
    /// ordinary offset rather than re-emitting the object.
    fn mark_visited(&mut self, addr: usize, pos: usize);

    /// Returns whether `addr` is already claimed by some `Box`/`Unique`
    /// owner.
    fn is_owned(&self, addr: usize) -> bool;

    /// Claims `addr` as owned by a `Box`/`Unique` handle. Callers must
    /// have already checked [`Self::is_owned`] and treated `true` as a
    /// graph-shape violation.
    fn mark_owned(&mut self, addr: usize);

    /// Defers patching the pointer slot at `slot_pos` until `addr` has
    /// been emitted (used when an `OPtr` is serialized before its target
    /// has been visited, i.e. a forward reference).
    fn defer(&mut self, addr: usize, slot_pos: usize);

    /// Resolves every deferred pending patch now that the full graph has
    /// been traversed and every reachable object's position is known.
    ///
    /// Returns [`Error::DanglingReference`] if some pending target was
    /// never emitted by any `Box`/`Unique` owner reachable from the root:
    /// every shared reference's target must be owned by some `Box`
    /// reachable from the root.
    fn drain_pending(&mut self) -> Result<(), Error>;
}
