//! The deserialization context: base pointer, buffer extent, and the
//! visited-slot bookkeeping that keeps the validation walk terminating on
//! cyclic graphs.

use hashbrown::HashSet;

use crate::error::Error;
use crate::hash::FxBuildHasher;
use crate::mode::Mode;
use crate::traits::Fallible;

use super::Deserializer;

/// The deserializer-side context: base pointer, extent, and active mode.
pub struct Tracker {
    base: *const u8,
    len: usize,
    mode: Mode,
    visited: HashSet<usize, FxBuildHasher>,
}

impl Tracker {
    /// Constructs a context over `[base, base + len)` validating under
    /// `mode`.
    pub fn new(base: *const u8, len: usize, mode: Mode) -> Self {
        Self {
            base,
            len,
            mode,
            visited: HashSet::default(),
        }
    }
}

impl Fallible for Tracker {
    type Error = Error;
}

impl Deserializer for Tracker {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn check(&self, ptr: *const u8, size: usize, align: usize) -> Result<(), Error> {
        if self.mode.contains(Mode::UNCHECKED) {
            return Ok(());
        }
        let base_addr = self.base as usize;
        let ptr_addr = ptr as usize;
        if ptr_addr < base_addr || ptr_addr.wrapping_add(size) > base_addr.wrapping_add(self.len) {
            return Err(Error::OutOfBounds {
                offset: crate::offset::signed_offset(base_addr, ptr_addr)?,
                size,
                buffer_len: self.len,
            });
        }
        if ptr_addr % align != 0 {
            return Err(Error::Misaligned {
                offset: crate::offset::signed_offset(base_addr, ptr_addr)?,
                align,
            });
        }
        Ok(())
    }

    fn mark_visited(&mut self, slot_addr: usize) -> bool {
        self.visited.insert(slot_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_bounds_pointer_passes() {
        let buf = [0u8; 16];
        let ctx = Tracker::new(buf.as_ptr(), buf.len(), Mode::NONE);
        assert!(ctx.check(unsafe { buf.as_ptr().add(4) }, 4, 1).is_ok());
    }

    #[test]
    fn out_of_bounds_pointer_fails() {
        let buf = [0u8; 16];
        let ctx = Tracker::new(buf.as_ptr(), buf.len(), Mode::NONE);
        assert!(matches!(
            ctx.check(unsafe { buf.as_ptr().add(12) }, 8, 1),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn unchecked_mode_skips_bounds() {
        let buf = [0u8; 16];
        let ctx = Tracker::new(buf.as_ptr(), buf.len(), Mode::UNCHECKED);
        assert!(ctx.check(core::ptr::null(), usize::MAX, 1).is_ok());
    }

    #[test]
    fn misaligned_pointer_fails() {
        let buf = [0u8; 16];
        let ctx = Tracker::new(buf.as_ptr(), buf.len(), Mode::NONE);
        let misaligned = unsafe { buf.as_ptr().add(1) };
        if (misaligned as usize) % 4 != 0 {
            assert!(matches!(ctx.check(misaligned, 4, 4), Err(Error::Misaligned { .. })));
        }
    }

    #[test]
    fn mark_visited_is_true_only_once() {
        let mut ctx = Tracker::new(core::ptr::null(), 0, Mode::NONE);
        assert!(ctx.mark_visited(0x1000));
        assert!(!ctx.mark_visited(0x1000));
    }
}
