//! The archived unique-ownership handle: a single `OPtr<T>` that is, at
//! the type level, understood to be the sole owner of its pointee, so
//! the serializer recurses into and emits it (unlike a bare, non-owning
//! `OPtr`/`*const T`, which only registers and resolves).

use core::mem::size_of;
use core::ops::Deref;

use crate::de::Deserializer;
use crate::error::Error;
use crate::offset::OPtr;
use crate::ser::Serializer;
use crate::traits::{Archive, Deserialize, Serialize};

/// The archived form of `Box<T>`.
#[repr(transparent)]
pub struct ArchivedBox<T> {
    ptr: OPtr<T>,
}

impl<T> ArchivedBox<T> {
    /// The pointee, resolved from this handle's self-relative offset.
    ///
    /// # Safety
    ///
    /// The buffer this archived value lives in must still be mapped and
    /// must not have been tampered with since it was validated.
    #[inline]
    pub unsafe fn get(&self) -> &T {
        &*self
            .ptr
            .resolve()
            .expect("Box pointee is never null")
    }
}

impl<T> Deref for ArchivedBox<T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { self.get() }
    }
}

impl<T: Archive> Archive for Box<T> {
    type Archived = ArchivedBox<T::Archived>;
}

impl<T, S> Serialize<S> for Box<T>
where
    T: Serialize<S>,
    S: Serializer + ?Sized,
{
    fn serialize_into(&self, pos: usize, serializer: &mut S) -> Result<(), S::Error> {
        let addr = self.as_ref() as *const T as usize;
        if serializer.is_owned(addr) {
            return Err(Error::SharedOwnership(addr));
        }
        serializer.mark_owned(addr);
        let target_pos = match serializer.visited(addr) {
            Some(existing) => existing,
            None => {
                let target_pos = serializer.reserve::<T::Archived>()?;
                // Recorded before recursing, so a cyclic back-edge
                // discovered while serializing the pointee resolves as an
                // ordinary offset rather than re-emitting it.
                serializer.mark_visited(addr, target_pos);
                self.as_ref().serialize_into(target_pos, serializer)?;
                target_pos
            }
        };
        let ptr = OPtr::<T::Archived>::from_positions(pos, target_pos)?;
        serializer.overwrite(pos, &ptr.to_le_bytes())?;
        Ok(())
    }
}

impl<T: Deserialize> Deserialize for Box<T> {
    fn deserialize<D: Deserializer + ?Sized>(archived: &ArchivedBox<T::Archived>, deserializer: &mut D) -> Result<(), D::Error> {
        let ptr = unsafe {
            archived
                .ptr
                .resolve()
                .expect("Box pointee is never null")
        };
        deserializer.check(ptr as *const u8, size_of::<T::Archived>(), core::mem::align_of::<T::Archived>())?;
        if deserializer.mark_visited(ptr as usize) {
            T::deserialize(unsafe { &*ptr }, deserializer)?;
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

    #[test]
    fn box_round_trips() {
        let value: Box<u32> = Box::new(99);
        let mut ctx = SerTracker::new();
        let pos = ctx.reserve::<ArchivedBox<u32>>().unwrap();
        value.serialize_into(pos, &mut ctx).unwrap();
        ctx.drain_pending().unwrap();
        let buf = ctx.into_buf();
        let archived = unsafe { &*(buf.as_ptr().add(pos) as *const ArchivedBox<u32>) };
        assert_eq!(unsafe { *archived.get() }, 99);
    }

    #[test]
    fn box_deserialize_validates_pointee() {
        let value: Box<u32> = Box::new(7);
        let mut ctx = SerTracker::new();
        let pos = ctx.reserve::<ArchivedBox<u32>>().unwrap();
        value.serialize_into(pos, &mut ctx).unwrap();
        ctx.drain_pending().unwrap();
        let buf = ctx.into_buf();
        let archived = unsafe { &*(buf.as_ptr().add(pos) as *const ArchivedBox<u32>) };
        let mut dctx = DeTracker::new(buf.as_ptr(), buf.len(), Mode::NONE);
        assert!(Box::<u32>::deserialize(archived, &mut dctx).is_ok());
    }
}
