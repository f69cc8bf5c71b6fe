//! The archived string container: a `{offset, size}` header pointing at a
//! contiguous UTF-8 payload emitted out-of-line.

use core::fmt;
use core::mem::size_of;
use core::str;

use crate::de::Deserializer;
use crate::error::Error;
use crate::offset::OPtr;
use crate::ser::Serializer;
use crate::traits::{Archive, Deserialize, Serialize};

/// The archived form of `String`/`&str`.
///
/// An empty string has `len == 0` and a null `ptr`.
#[repr(C)]
pub struct ArchivedString {
    ptr: OPtr<u8>,
    len: u32,
}

impl ArchivedString {
    /// The length of the string in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether the string is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The string's bytes, resolved from this header's self-relative
    /// offset.
    ///
    /// # Safety
    ///
    /// The buffer this archived value lives in must still be mapped and
    /// must not have been tampered with since it was validated.
    #[inline]
    pub unsafe fn as_bytes(&self) -> &[u8] {
        if self.is_empty() {
            &[]
        } else {
            let ptr = self.ptr.resolve().expect("non-empty string has non-null ptr");
            core::slice::from_raw_parts(ptr, self.len())
        }
    }

    /// The string, resolved and validated as UTF-8.
    ///
    /// # Safety
    ///
    /// Same obligations as [`Self::as_bytes`]. The engine trusts that the
    /// bytes were written by this crate's own serializer, so no UTF-8
    /// re-validation is performed.
    #[inline]
    pub unsafe fn as_str(&self) -> &str {
        str::from_utf8_unchecked(self.as_bytes())
    }
}

impl fmt::Debug for ArchivedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("\"\"")
        } else {
            // SAFETY: only used for Debug of a value the caller already
            // holds a live reference to.
            unsafe { write!(f, "{:?}", self.as_str()) }
        }
    }
}

impl Archive for String {
    type Archived = ArchivedString;
}

impl Archive for str {
    type Archived = ArchivedString;
}

impl<S: Serializer + ?Sized> Serialize<S> for String {
    fn serialize_into(&self, pos: usize, serializer: &mut S) -> Result<(), S::Error> {
        self.as_str().serialize_into(pos, serializer)
    }
}

impl<S: Serializer + ?Sized> Serialize<S> for str {
    fn serialize_into(&self, pos: usize, serializer: &mut S) -> Result<(), S::Error> {
        if self.is_empty() {
            serializer.overwrite(pos, &0i64.to_le_bytes())?;
            serializer.overwrite(pos + size_of::<OPtr<u8>>(), &0u32.to_le_bytes())?;
            return Ok(());
        }
        let payload_pos = serializer.reserve_bytes(1, self.len())?;
        serializer.overwrite(payload_pos, self.as_bytes())?;
        let ptr = OPtr::<u8>::from_positions(pos, payload_pos)?;
        serializer.overwrite(pos, &ptr.to_le_bytes())?;
        serializer.overwrite(pos + size_of::<OPtr<u8>>(), &(self.len() as u32).to_le_bytes())?;
        Ok(())
    }
}

impl Deserialize for String {
    fn deserialize<D: Deserializer + ?Sized>(archived: &ArchivedString, deserializer: &mut D) -> Result<(), D::Error> {
        if archived.is_empty() {
            return Ok(());
        }
        let ptr = unsafe { archived.ptr.resolve() }.expect("non-empty string has non-null ptr");
        deserializer.check(ptr as *const u8, archived.len(), 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::de::Tracker as DeTracker;
    use crate::mode::Mode;
    use crate::ser::Tracker as SerTracker;

    fn roundtrip(s: &str) -> (crate::align::AlignedVec, usize) {
        let mut ctx = SerTracker::new();
        let pos = ctx.reserve::<ArchivedString>().unwrap();
        s.serialize_into(pos, &mut ctx).unwrap();
        ctx.drain_pending().unwrap();
        (ctx.into_buf(), pos)
    }

    #[test]
    fn empty_string_has_null_zero_header() {
        let (buf, pos) = roundtrip("");
        let archived = unsafe { &*(buf.as_ptr().add(pos) as *const ArchivedString) };
        assert!(archived.is_empty());
        assert!(archived.ptr.is_null());
    }

    #[test]
    fn non_empty_string_round_trips() {
        let (buf, pos) = roundtrip("hello, world");
        let archived = unsafe { &*(buf.as_ptr().add(pos) as *const ArchivedString) };
        assert_eq!(unsafe { archived.as_str() }, "hello, world");
    }

    #[test]
    fn deserialize_validates_bounds() {
        let (buf, pos) = roundtrip("hi");
        let archived = unsafe { &*(buf.as_ptr().add(pos) as *const ArchivedString) };
        let mut dctx = DeTracker::new(buf.as_ptr(), buf.len(), Mode::NONE);
        assert!(String::deserialize(archived, &mut dctx).is_ok());
    }
}
