//! The three top-level entry points: [`to_bytes`] (serialize), [`access`]
//! (the lazy "cast" view), and [`access_mut`] (the eager, validated
//! view).

use core::mem::{align_of, size_of};

use crate::align::AlignedVec;
use crate::de::Tracker as DeTracker;
use crate::envelope;
use crate::error::Error;
use crate::hash::{hash_bytes_oneshot, type_hash};
use crate::mode::Mode;
use crate::ser::{Serializer as _, Tracker as SerTracker};
use crate::traits::{Deserialize, Serialize};

/// Serializes `value` into a freshly allocated buffer under `mode`.
///
/// The root serialization procedure: write the optional version header,
/// reserve space for the root, recursively serialize it, drain
/// forward-reference patches, then append the optional integrity
/// trailer.
pub fn to_bytes<T>(value: &T, mode: Mode) -> Result<AlignedVec, Error>
where
    T: Serialize<SerTracker>,
{
    let mut ctx = SerTracker::new();
    if mode.contains(Mode::WITH_VERSION) {
        ctx.write(&type_hash::<T>().to_le_bytes())?;
    }
    let root_pos = ctx.reserve::<T::Archived>()?;
    value.serialize_into(root_pos, &mut ctx)?;
    ctx.drain_pending()?;
    let mut buf = ctx.into_buf();
    if mode.contains(Mode::WITH_INTEGRITY) {
        let hash = hash_bytes_oneshot(&buf[envelope::header_len(mode)..]);
        buf.extend_from_slice(&hash.to_le_bytes());
    }
    Ok(buf)
}

/// Validates the envelope (if any) and locates the root object, without
/// yet deciding how eagerly to walk the rest of the graph.
fn locate_root<T: Deserialize>(bytes: &[u8], mode: Mode) -> Result<usize, Error> {
    let (header, payload_end) = envelope::validate::<T>(bytes, mode)?;
    let root = envelope::root_offset(mode, align_of::<T::Archived>());
    let root_size = size_of::<T::Archived>();
    if root < header || root + root_size > payload_end {
        return Err(Error::OutOfBounds {
            offset: root as isize,
            size: root_size,
            buffer_len: bytes.len(),
        });
    }
    Ok(root)
}

/// Validates the envelope and returns a reference to the root archived
/// value without eagerly walking the graph (the lazy "cast" entry
/// point).
///
/// Every subsequent field/element access resolves its own `OPtr`s
/// self-relatively on demand. No bounds/alignment walk of the reachable
/// graph happens here unless [`Mode::DEEP_CHECK`] is set, in which case
/// this performs the same full recursive validation as [`access_mut`]
/// despite returning a shared reference.
pub fn access<T>(bytes: &[u8], mode: Mode) -> Result<&T::Archived, Error>
where
    T: Deserialize,
{
    let root = locate_root::<T>(bytes, mode)?;
    let archived = unsafe { &*(bytes.as_ptr().add(root) as *const T::Archived) };
    if mode.contains(Mode::DEEP_CHECK) {
        let mut dctx = DeTracker::new(bytes.as_ptr(), bytes.len(), mode);
        T::deserialize(archived, &mut dctx)?;
    }
    Ok(archived)
}

/// Validates the envelope, eagerly walks and validates the whole
/// reachable graph (unless [`Mode::UNCHECKED`]), and returns a mutable
/// reference to the root archived value (the eager entry point).
pub fn access_mut<T>(bytes: &mut [u8], mode: Mode) -> Result<&mut T::Archived, Error>
where
    T: Deserialize,
{
    let root = locate_root::<T>(bytes, mode)?;
    let base = bytes.as_ptr();
    let len = bytes.len();
    let ptr = unsafe { bytes.as_mut_ptr().add(root) as *mut T::Archived };
    if !mode.contains(Mode::UNCHECKED) {
        let mut dctx = DeTracker::new(base, len, mode);
        T::deserialize(unsafe { &*ptr }, &mut dctx)?;
    }
    Ok(unsafe { &mut *ptr })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_round_trips_with_no_envelope() {
        let bytes = to_bytes(&42u32, Mode::NONE).unwrap();
        assert_eq!(*access::<u32>(&bytes, Mode::NONE).unwrap(), 42);
    }

    #[test]
    fn scalar_round_trips_with_full_envelope() {
        let mode = Mode::WITH_VERSION | Mode::WITH_INTEGRITY;
        let bytes = to_bytes(&7u64, mode).unwrap();
        assert_eq!(*access::<u64>(&bytes, mode).unwrap(), 7);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let bytes = to_bytes(&1u32, Mode::WITH_VERSION).unwrap();
        assert!(matches!(
            access::<u64>(&bytes, Mode::WITH_VERSION),
            Err(Error::VersionMismatch { .. })
        ));
    }

    #[test]
    fn tampered_integrity_is_rejected() {
        let mut bytes = to_bytes(&1u32, Mode::WITH_INTEGRITY).unwrap();
        bytes[0] ^= 0xff;
        assert!(matches!(
            access::<u32>(&bytes, Mode::WITH_INTEGRITY),
            Err(Error::IntegrityMismatch)
        ));
    }

    #[test]
    fn access_mut_validates_string_round_trip() {
        let value = String::from("hello");
        let mut bytes = to_bytes(&value, Mode::NONE).unwrap();
        let archived = access_mut::<String>(&mut bytes, Mode::NONE).unwrap();
        assert_eq!(unsafe { archived.as_str() }, "hello");
    }
}
