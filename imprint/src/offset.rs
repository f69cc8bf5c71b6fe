//! The self-relative pointer primitive.
//!
//! `OPtr<T>` stores the byte distance from its own storage location to its
//! target rather than an absolute address, which is what makes a buffer
//! full of them relocatable: moving the whole buffer moves every pointer
//! and every pointee together, so every delta is still correct.

use core::any::type_name;
use core::cmp;
use core::fmt;
use core::marker::PhantomData;

use crate::error::Error;

/// Computes the signed byte distance from `from` to `to`.
///
/// This exists because subtracting two `usize` addresses directly loses
/// the sign; the result here is exact across the full range representable
/// in an `isize`, which is what a self-relative pointer needs since the
/// target may lie either before or after its storage slot.
#[inline]
pub fn signed_offset(from: usize, to: usize) -> Result<isize, Error> {
    let (result, overflow) = to.overflowing_sub(from);
    if (!overflow && result <= isize::MAX as usize) || (overflow && result >= isize::MIN as usize) {
        Ok(result as isize)
    } else {
        Err(Error::OffsetOverflow)
    }
}

/// The sentinel delta meaning "null". A pointer may never legitimately
/// have a delta of zero otherwise, since that would mean it points at
/// itself.
const NULL_DELTA: i64 = 0;

/// A self-relative, nullable pointer to a `T`.
///
/// `OPtr<T>` is the non-owning analogue of [`crate::boxed::ArchivedBox`]:
/// it participates in the serializer's `visited`/`pending` bookkeeping as
/// a *referent* (it is registered and resolved) but is never itself an
/// emission site, so the object it points to must be reachable and
/// emitted via some other owning path (typically a `Box<T>` field
/// somewhere else in the graph).
#[repr(transparent)]
pub struct OPtr<T> {
    delta: i64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> OPtr<T> {
    /// A null pointer.
    #[inline]
    pub const fn null() -> Self {
        Self { delta: NULL_DELTA, _marker: PhantomData }
    }

    /// Whether this pointer is null.
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.delta == NULL_DELTA
    }

    /// Builds a pointer whose slot will live at `pos` and whose target is
    /// `target_pos`, both expressed as byte offsets from the start of the
    /// same buffer.
    ///
    /// It is an error (and forbidden by the engine's invariants) for
    /// `target_pos == pos`, since that is indistinguishable from null;
    /// this constructor still produces the (unusable) delta-zero value in
    /// that case and callers are expected to guard against it up front
    /// with `target is not the slot itself`.
    #[inline]
    pub fn from_positions(pos: usize, target_pos: usize) -> Result<Self, Error> {
        let delta = signed_offset(pos, target_pos)?;
        Ok(Self { delta: delta as i64, _marker: PhantomData })
    }

    /// Resolves this pointer to an absolute address, given the address of
    /// its own storage slot. Returns `None` if null.
    ///
    /// # Safety
    ///
    /// `self_addr` must be the true address of `self`, and if non-null the
    /// resolved address must point to a live, correctly aligned `T` for
    /// the lifetime the caller intends to use it.
    #[inline]
    pub unsafe fn resolve_raw(&self, self_addr: usize) -> Option<*const T> {
        if self.is_null() {
            None
        } else {
            Some((self_addr as isize + self.delta as isize) as usize as *const T)
        }
    }

    /// Resolves `self`'s pointer using `self`'s own address as the slot
    /// address. This is the form used once an `OPtr<T>` is embedded in a
    /// live (deserialized, or in-memory pre-serialization) graph.
    ///
    /// # Safety
    ///
    /// Same obligations as [`Self::resolve_raw`].
    #[inline]
    pub unsafe fn resolve(&self) -> Option<*const T> {
        self.resolve_raw(self as *const Self as usize)
    }

    /// The little-endian bytes of the stored delta, for writing directly
    /// into a reserved buffer slot.
    #[inline]
    pub fn to_le_bytes(self) -> [u8; 8] {
        self.delta.to_le_bytes()
    }

}

impl<T> Clone for OPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for OPtr<T> {}

impl<T> fmt::Debug for OPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OPtr").field("delta", &self.delta).field("target_ty", &type_name::<T>()).finish()
    }
}

impl<T> cmp::PartialEq for OPtr<T> {
    /// Equality is by resolved target address, not by stored delta: two
    /// pointers at different slots pointing at the same object compare
    /// equal.
    fn eq(&self, other: &Self) -> bool {
        match (self.is_null(), other.is_null()) {
            (true, true) => true,
            (true, false) | (false, true) => false,
            (false, false) => unsafe {
                self.resolve().map(|p| p as usize) == other.resolve().map(|p| p as usize)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_offset_basic() {
        assert_eq!(signed_offset(0, 1).unwrap(), 1);
        assert_eq!(signed_offset(1, 0).unwrap(), -1);
        assert_eq!(signed_offset(10, 10).unwrap(), 0);
    }

    #[test]
    fn null_is_default() {
        let p: OPtr<u32> = OPtr::null();
        assert!(p.is_null());
    }

    #[test]
    fn from_positions_roundtrips() {
        let p: OPtr<u32> = OPtr::from_positions(100, 164).unwrap();
        assert!(!p.is_null());
        assert_eq!(p.delta, 64);
    }
}
