//! The archived vector container: a `{offset, size}` header pointing at
//! `size` contiguous elements emitted out-of-line.
//!
//! A deserialized vector's storage always lives inside the buffer (there
//! is never a separately-allocated backing store to distinguish), so the
//! notion of a self-allocated flag is realized implicitly by this type
//! offering no API that could grow or reallocate it (mutation through
//! this vector is forbidden), enforced by `ArchivedVec` simply never
//! implementing `DerefMut`/`push`/etc. Capacity is likewise always equal
//! to size for a buffer-backed vector, so it is not stored separately;
//! there is nothing to reserve ahead of use once the buffer is
//! immutable.

use core::mem::{align_of, size_of};
use core::ops::Deref;

use crate::de::Deserializer;
use crate::offset::OPtr;
use crate::ser::Serializer;
use crate::traits::{Archive, Deserialize, Serialize};

/// The archived form of `Vec<T>`/`&[T]`.
#[repr(C)]
pub struct ArchivedVec<T> {
    ptr: OPtr<T>,
    len: u32,
}

impl<T> ArchivedVec<T> {
    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether the vector is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The elements, resolved from this header's self-relative offset.
    ///
    /// # Safety
    ///
    /// The buffer this archived value lives in must still be mapped and
    /// must not have been tampered with since it was validated.
    #[inline]
    pub unsafe fn as_slice(&self) -> &[T] {
        if self.is_empty() {
            &[]
        } else {
            let ptr = self.ptr.resolve().expect("non-empty vec has non-null ptr");
            core::slice::from_raw_parts(ptr, self.len())
        }
    }
}

impl<T> Deref for ArchivedVec<T> {
    type Target = [T];

    /// Buffer-backed archived vectors are always immutably shared once
    /// deserialized, so a safe `Deref` is the only access this type
    /// exposes; there is no `DerefMut`.
    fn deref(&self) -> &[T] {
        unsafe { self.as_slice() }
    }
}

impl<T: Archive> Archive for Vec<T> {
    type Archived = ArchivedVec<T::Archived>;
}

impl<T: Archive> Archive for [T] {
    type Archived = ArchivedVec<T::Archived>;
}

impl<T, S> Serialize<S> for Vec<T>
where
    T: Serialize<S>,
    S: Serializer + ?Sized,
{
    fn serialize_into(&self, pos: usize, serializer: &mut S) -> Result<(), S::Error> {
        self.as_slice().serialize_into(pos, serializer)
    }
}

impl<T, S> Serialize<S> for [T]
where
    T: Serialize<S>,
    S: Serializer + ?Sized,
{
    fn serialize_into(&self, pos: usize, serializer: &mut S) -> Result<(), S::Error> {
        if self.is_empty() {
            serializer.overwrite(pos, &0i64.to_le_bytes())?;
            serializer.overwrite(pos + size_of::<OPtr<T::Archived>>(), &0u32.to_le_bytes())?;
            return Ok(());
        }
        let elem_size = size_of::<T::Archived>();
        let elems_pos = serializer.reserve_bytes(align_of::<T::Archived>(), elem_size * self.len())?;
        for (i, elem) in self.iter().enumerate() {
            elem.serialize_into(elems_pos + i * elem_size, serializer)?;
        }
        let ptr = OPtr::<T::Archived>::from_positions(pos, elems_pos)?;
        serializer.overwrite(pos, &ptr.to_le_bytes())?;
        serializer.overwrite(
            pos + size_of::<OPtr<T::Archived>>(),
            &(self.len() as u32).to_le_bytes(),
        )?;
        Ok(())
    }
}

impl<T: Deserialize> Deserialize for Vec<T> {
    fn deserialize<D: Deserializer + ?Sized>(
        archived: &ArchivedVec<T::Archived>,
        deserializer: &mut D,
    ) -> Result<(), D::Error> {
        if archived.is_empty() {
            return Ok(());
        }
        let ptr = unsafe { archived.ptr.resolve() }.expect("non-empty vec has non-null ptr");
        let elem_align = align_of::<T::Archived>();
        deserializer.check(
            ptr as *const u8,
            size_of::<T::Archived>() * archived.len(),
            elem_align,
        )?;
        for elem in unsafe { archived.as_slice() } {
            T::deserialize(elem, deserializer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::de::Tracker as DeTracker;
    use crate::mode::Mode;
    use crate::ser::Tracker as SerTracker;

    fn roundtrip(v: &[u32]) -> (crate::align::AlignedVec, usize) {
        let mut ctx = SerTracker::new();
        let pos = ctx.reserve::<ArchivedVec<u32>>().unwrap();
        v.serialize_into(pos, &mut ctx).unwrap();
        ctx.drain_pending().unwrap();
        (ctx.into_buf(), pos)
    }

    #[test]
    fn empty_vec_has_null_zero_header() {
        let (buf, pos) = roundtrip(&[]);
        let archived = unsafe { &*(buf.as_ptr().add(pos) as *const ArchivedVec<u32>) };
        assert!(archived.is_empty());
        assert!(archived.ptr.is_null());
    }

    #[test]
    fn non_empty_vec_round_trips() {
        let (buf, pos) = roundtrip(&[1, 2, 3, 4]);
        let archived = unsafe { &*(buf.as_ptr().add(pos) as *const ArchivedVec<u32>) };
        assert_eq!(&archived[..], &[1, 2, 3, 4]);
    }

    #[test]
    fn deserialize_validates_bounds_and_elements() {
        let (buf, pos) = roundtrip(&[5, 6]);
        let archived = unsafe { &*(buf.as_ptr().add(pos) as *const ArchivedVec<u32>) };
        let mut dctx = DeTracker::new(buf.as_ptr(), buf.len(), Mode::NONE);
        assert!(Vec::<u32>::deserialize(archived, &mut dctx).is_ok());
    }
}
