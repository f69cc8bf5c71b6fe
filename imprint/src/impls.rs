//! Hand-written impls for types the derive macro doesn't touch: scalars
//! (emitted as a raw byte copy), fixed-size arrays, tuples, and the
//! non-owning raw-pointer referent (a shared reference without
//! ownership).

use core::mem::size_of;

use crate::de::Deserializer;
use crate::error::Error;
use crate::offset::{signed_offset, OPtr};
use crate::ser::Serializer;
use crate::traits::{Archive, Deserialize, Serialize};

/// Implements `Archive`/`Serialize`/`Deserialize` for a scalar type whose
/// archived representation is itself: serialize copies the raw bytes,
/// deserialize is a no-op (no pointers to validate).
macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Archive for $ty {
                type Archived = $ty;
            }

            impl<S: Serializer + ?Sized> Serialize<S> for $ty {
                fn serialize_into(&self, pos: usize, serializer: &mut S) -> Result<(), S::Error> {
                    serializer.overwrite(pos, &self.to_le_bytes())
                }
            }

            impl Deserialize for $ty {
                fn deserialize<D: Deserializer + ?Sized>(_: &$ty, _: &mut D) -> Result<(), D::Error> {
                    Ok(())
                }
            }
        )*
    };
}

impl_scalar!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128, f32, f64);

impl Archive for bool {
    type Archived = bool;
}

impl<S: Serializer + ?Sized> Serialize<S> for bool {
    fn serialize_into(&self, pos: usize, serializer: &mut S) -> Result<(), S::Error> {
        serializer.overwrite(pos, &[*self as u8])
    }
}

impl Deserialize for bool {
    fn deserialize<D: Deserializer + ?Sized>(_: &bool, _: &mut D) -> Result<(), D::Error> {
        Ok(())
    }
}

impl Archive for char {
    type Archived = char;
}

impl<S: Serializer + ?Sized> Serialize<S> for char {
    fn serialize_into(&self, pos: usize, serializer: &mut S) -> Result<(), S::Error> {
        serializer.overwrite(pos, &(*self as u32).to_le_bytes())
    }
}

impl Deserialize for char {
    fn deserialize<D: Deserializer + ?Sized>(_: &char, _: &mut D) -> Result<(), D::Error> {
        Ok(())
    }
}

impl Archive for () {
    type Archived = ();
}

impl<S: Serializer + ?Sized> Serialize<S> for () {
    fn serialize_into(&self, _pos: usize, _serializer: &mut S) -> Result<(), S::Error> {
        Ok(())
    }
}

impl Deserialize for () {
    fn deserialize<D: Deserializer + ?Sized>(_: &(), _: &mut D) -> Result<(), D::Error> {
        Ok(())
    }
}

impl<T: Archive, const N: usize> Archive for [T; N] {
    type Archived = [T::Archived; N];
}

impl<T, S, const N: usize> Serialize<S> for [T; N]
where
    T: Serialize<S>,
    S: Serializer + ?Sized,
{
    fn serialize_into(&self, pos: usize, serializer: &mut S) -> Result<(), S::Error> {
        let elem_size = size_of::<T::Archived>();
        for (i, elem) in self.iter().enumerate() {
            elem.serialize_into(pos + i * elem_size, serializer)?;
        }
        Ok(())
    }
}

impl<T: Deserialize, const N: usize> Deserialize for [T; N] {
    fn deserialize<D: crate::de::Deserializer + ?Sized>(
        archived: &[T::Archived; N],
        deserializer: &mut D,
    ) -> Result<(), D::Error> {
        for elem in archived.iter() {
            T::deserialize(elem, deserializer)?;
        }
        Ok(())
    }
}

macro_rules! impl_tuple {
    ($($idx:tt $name:ident),+) => {
        impl<$($name: Archive),+> Archive for ($($name,)+) {
            type Archived = ($($name::Archived,)+);
        }

        impl<S, $($name),+> Serialize<S> for ($($name,)+)
        where
            S: Serializer + ?Sized,
            $($name: Serialize<S>,)+
        {
            fn serialize_into(&self, pos: usize, serializer: &mut S) -> Result<(), S::Error> {
                $(
                    self.$idx.serialize_into(
                        pos + $crate::field_offset!(($($name::Archived,)+), $idx),
                        serializer,
                    )?;
                )+
                Ok(())
            }
        }

        impl<$($name: Deserialize),+> Deserialize for ($($name,)+) {
            fn deserialize<D: crate::de::Deserializer + ?Sized>(
                archived: &($($name::Archived,)+),
                deserializer: &mut D,
            ) -> Result<(), D::Error> {
                $(
                    $name::deserialize(&archived.$idx, deserializer)?;
                )+
                Ok(())
            }
        }
    };
}

impl_tuple!(0 A);
impl_tuple!(0 A, 1 B);
impl_tuple!(0 A, 1 B, 2 C);
impl_tuple!(0 A, 1 B, 2 C, 3 D);
impl_tuple!(0 A, 1 B, 2 C, 3 D, 4 E);
impl_tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F);

/// A non-owning, nullable reference to a source object owned elsewhere
/// through some `Box<T>` reachable from the root.
///
/// The serializer treats this as a pure referent: it registers/resolves
/// against `visited`, but (unlike `Box<T>`) never reserves space for or
/// recurses into the pointee itself. Building one
/// requires `unsafe` because nothing stops the caller from pointing it at
/// an object that is never actually owned by a `Box` in the same graph,
/// which would surface as [`Error::DanglingReference`] only once the
/// graph is serialized.
impl<T: Archive> Archive for *const T {
    type Archived = OPtr<T::Archived>;
}

impl<T, S> Serialize<S> for *const T
where
    T: Archive,
    S: Serializer + ?Sized,
{
    fn serialize_into(&self, pos: usize, serializer: &mut S) -> Result<(), S::Error> {
        if self.is_null() {
            serializer.overwrite(pos, &0i64.to_le_bytes())?;
            return Ok(());
        }
        let addr = *self as usize;
        match serializer.visited(addr) {
            Some(target_pos) => {
                let delta = signed_offset(pos, target_pos)?;
                serializer.overwrite(pos, &delta.to_le_bytes())
            }
            None => {
                serializer.overwrite(pos, &0i64.to_le_bytes())?;
                serializer.defer(addr, pos);
                Ok(())
            }
        }
    }
}

impl<T: Deserialize> Deserialize for *const T {
    fn deserialize<D: Deserializer + ?Sized>(archived: &OPtr<T::Archived>, deserializer: &mut D) -> Result<(), D::Error> {
        if archived.is_null() {
            return Ok(());
        }
        let ptr = unsafe { archived.resolve() }.expect("checked non-null above");
        deserializer.check(ptr as *const u8, size_of::<T::Archived>(), core::mem::align_of::<T::Archived>())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ser::Tracker as SerTracker;

    #[test]
    fn scalar_round_trips() {
        let mut ctx = SerTracker::new();
        let pos = ctx.reserve::<u32>().unwrap();
        42u32.serialize_into(pos, &mut ctx).unwrap();
        let buf = ctx.into_buf();
        assert_eq!(u32::from_le_bytes(buf[pos..pos + 4].try_into().unwrap()), 42);
    }

    #[test]
    fn array_round_trips() {
        let mut ctx = SerTracker::new();
        let pos = ctx.reserve::<[u16; 3]>().unwrap();
        [1u16, 2, 3].serialize_into(pos, &mut ctx).unwrap();
        let buf = ctx.into_buf();
        let archived = unsafe { &*(buf.as_ptr().add(pos) as *const [u16; 3]) };
        assert_eq!(*archived, [1, 2, 3]);
    }

    #[test]
    fn tuple_round_trips() {
        let mut ctx = SerTracker::new();
        let pos = ctx.reserve::<(u8, u32)>().unwrap();
        (7u8, 900u32).serialize_into(pos, &mut ctx).unwrap();
        let buf = ctx.into_buf();
        let archived = unsafe { &*(buf.as_ptr().add(pos) as *const (u8, u32)) };
        assert_eq!(*archived, (7, 900));
    }

    #[test]
    fn raw_ref_to_unvisited_target_is_dangling() {
        let mut ctx = SerTracker::new();
        let pos = ctx.reserve::<OPtr<u32>>().unwrap();
        let value: u32 = 5;
        (&value as *const u32).serialize_into(pos, &mut ctx).unwrap();
        assert!(matches!(ctx.drain_pending(), Err(Error::DanglingReference(_))));
    }
}
