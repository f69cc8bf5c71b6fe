//! Buffer envelope: the optional leading type-hash and trailing integrity
//! hash that frame the payload.
//!
//! ```text
//! [type-hash (8 bytes, if WITH_VERSION)]
//! [payload: root object followed by its transitively reachable objects]
//! [content-hash (8 bytes, if WITH_INTEGRITY)]
//! ```

use crate::error::Error;
use crate::hash::{hash_bytes_oneshot, type_hash};
use crate::mode::Mode;

const HASH_LEN: usize = 8;

/// Length in bytes of the leading type-hash, or `0` if
/// [`Mode::WITH_VERSION`] is not set.
#[inline]
pub fn header_len(mode: Mode) -> usize {
    if mode.contains(Mode::WITH_VERSION) {
        HASH_LEN
    } else {
        0
    }
}

/// Length in bytes of the trailing content hash, or `0` if
/// [`Mode::WITH_INTEGRITY`] is not set.
#[inline]
pub fn trailer_len(mode: Mode) -> usize {
    if mode.contains(Mode::WITH_INTEGRITY) {
        HASH_LEN
    } else {
        0
    }
}

/// The offset the root object is reserved at: the header length, rounded
/// up to `root_align`, so a root wider than 8-byte aligned still lands
/// correctly.
#[inline]
pub fn root_offset(mode: Mode, root_align: usize) -> usize {
    debug_assert!(root_align.is_power_of_two());
    let header = header_len(mode);
    (header + root_align - 1) & !(root_align - 1)
}

/// Validates the envelope of `bytes` against `mode` and the expected root
/// type `T`, returning the `[header_len, payload_end)` byte range the
/// payload (root object onward) occupies.
///
/// `T` here is the caller's logical root type (not its `Archived` form),
/// the same type whose [`type_hash`] was embedded by [`crate::api::to_bytes`].
pub fn validate<T: ?Sized>(bytes: &[u8], mode: Mode) -> Result<(usize, usize), Error> {
    let header = header_len(mode);
    let trailer = trailer_len(mode);
    if bytes.len() < header + trailer {
        return Err(Error::OutOfBounds {
            offset: 0,
            size: header + trailer,
            buffer_len: bytes.len(),
        });
    }
    if mode.contains(Mode::WITH_VERSION) {
        let found = u64::from_le_bytes(bytes[..HASH_LEN].try_into().expect("checked above"));
        let expected = type_hash::<T>();
        if found != expected {
            return Err(Error::VersionMismatch { found, expected });
        }
    }
    let payload_end = bytes.len() - trailer;
    if mode.contains(Mode::WITH_INTEGRITY) {
        let found = hash_bytes_oneshot(&bytes[header..payload_end]);
        let expected = u64::from_le_bytes(bytes[payload_end..].try_into().expect("checked above"));
        if found != expected {
            return Err(Error::IntegrityMismatch);
        }
    }
    Ok((header, payload_end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_trailer_len_follow_mode() {
        assert_eq!(header_len(Mode::NONE), 0);
        assert_eq!(header_len(Mode::WITH_VERSION), 8);
        assert_eq!(trailer_len(Mode::NONE), 0);
        assert_eq!(trailer_len(Mode::WITH_INTEGRITY), 8);
    }

    #[test]
    fn root_offset_rounds_up_to_alignment() {
        assert_eq!(root_offset(Mode::NONE, 4), 0);
        assert_eq!(root_offset(Mode::WITH_VERSION, 4), 8);
        assert_eq!(root_offset(Mode::WITH_VERSION, 16), 16);
    }

    #[test]
    fn validate_rejects_short_buffers() {
        let bytes = [0u8; 4];
        assert!(matches!(
            validate::<u32>(&bytes, Mode::WITH_VERSION),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn validate_detects_version_mismatch() {
        let mut bytes = type_hash::<u64>().to_le_bytes().to_vec();
        bytes.extend_from_slice(&0u32.to_le_bytes());
        assert!(matches!(
            validate::<u32>(&bytes, Mode::WITH_VERSION),
            Err(Error::VersionMismatch { .. })
        ));
    }

    #[test]
    fn validate_detects_integrity_mismatch() {
        let payload = 42u32.to_le_bytes();
        let mut bytes = payload.to_vec();
        let hash = hash_bytes_oneshot(&payload);
        bytes.extend_from_slice(&(hash ^ 1).to_le_bytes());
        assert!(matches!(
            validate::<u32>(&bytes, Mode::WITH_INTEGRITY),
            Err(Error::IntegrityMismatch)
        ));
    }
}
