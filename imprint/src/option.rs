//! `Option<T>` support: a realistic struct routinely has optional fields,
//! so the engine archives `Option<T>` as a tagged two-variant enum
//! mirroring the source.

use crate::de::Deserializer;
use crate::field_offset;
use crate::ser::Serializer;
use crate::traits::{Archive, Deserialize, Serialize};

/// The archived form of `Option<T>`.
#[repr(u8)]
pub enum ArchivedOption<T> {
    /// No value.
    None,
    /// A present value.
    Some(T),
}

/// A layout-only shadow of the `Some` variant, used solely to compute the
/// byte offset of its payload via [`field_offset!`], since Rust does not
/// expose a stable, generic way to project into a specific enum variant's
/// field without an initialized discriminant. A `#[repr(C)]`
/// tuple struct of `(u8, T)` lays its fields out identically to how
/// rustc places the discriminant and payload of a `#[repr(u8)]` enum's
/// sole data-carrying variant.
#[repr(C)]
#[allow(dead_code)]
struct SomeShadow<T>(u8, T);

impl<T> ArchivedOption<T> {
    /// Converts to `Option<&T>`.
    #[inline]
    pub fn as_ref(&self) -> Option<&T> {
        match self {
            ArchivedOption::None => None,
            ArchivedOption::Some(value) => Some(value),
        }
    }

    /// Whether this is the `None` variant.
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, ArchivedOption::None)
    }
}

fn payload_offset<T>() -> usize {
    field_offset!(SomeShadow<T>, 0)
}

impl<T: Archive> Archive for Option<T> {
    type Archived = ArchivedOption<T::Archived>;
}

impl<T, S> Serialize<S> for Option<T>
where
    T: Serialize<S>,
    S: Serializer + ?Sized,
{
    fn serialize_into(&self, pos: usize, serializer: &mut S) -> Result<(), S::Error> {
        match self {
            None => {
                serializer.overwrite(pos, &[0u8])?;
            }
            Some(value) => {
                serializer.overwrite(pos, &[1u8])?;
                value.serialize_into(pos + payload_offset::<T::Archived>(), serializer)?;
            }
        }
        Ok(())
    }
}

impl<T: Deserialize> Deserialize for Option<T> {
    fn deserialize<D: Deserializer + ?Sized>(
        archived: &ArchivedOption<T::Archived>,
        deserializer: &mut D,
    ) -> Result<(), D::Error> {
        if let Some(value) = archived.as_ref() {
            T::deserialize(value, deserializer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ser::Tracker as SerTracker;

    #[test]
    fn none_round_trips() {
        let value: Option<u32> = None;
        let mut ctx = SerTracker::new();
        let pos = ctx.reserve::<ArchivedOption<u32>>().unwrap();
        value.serialize_into(pos, &mut ctx).unwrap();
        let buf = ctx.into_buf();
        let archived = unsafe { &*(buf.as_ptr().add(pos) as *const ArchivedOption<u32>) };
        assert!(archived.is_none());
    }

    #[test]
    fn some_round_trips() {
        let value: Option<u32> = Some(123);
        let mut ctx = SerTracker::new();
        let pos = ctx.reserve::<ArchivedOption<u32>>().unwrap();
        value.serialize_into(pos, &mut ctx).unwrap();
        let buf = ctx.into_buf();
        let archived = unsafe { &*(buf.as_ptr().add(pos) as *const ArchivedOption<u32>) };
        assert_eq!(archived.as_ref().copied(), Some(123));
    }
}
