//! The mode bit set: flags shared between the producer and the consumer
//! of a buffer. There is no runtime configuration object beyond this,
//! just a single `Mode` value, passed explicitly to every
//! serialize/deserialize entry point.

use core::ops::{BitOr, BitOrAssign};

/// A bit set of serialize/deserialize behaviors.
///
/// Producer and consumer must agree on every bit: the envelope's shape
/// (which leading/trailing fields exist) is entirely determined by
/// [`Mode::WITH_VERSION`] and [`Mode::WITH_INTEGRITY`], so a mismatched
/// `Mode` does not just change validation strictness, it changes where
/// the payload itself starts and ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mode(u32);

impl Mode {
    /// No flags set: no envelope, eager bounds/alignment checking on
    /// access, no cast view.
    pub const NONE: Mode = Mode(0);

    /// Embed and check a leading 64-bit structural type hash of the root
    /// type.
    pub const WITH_VERSION: Mode = Mode(1 << 0);

    /// Embed and check a trailing 64-bit content hash over the payload.
    pub const WITH_INTEGRITY: Mode = Mode(1 << 1);

    /// Skip bounds and alignment validation on deserialize. The consumer
    /// is assumed trusted; error kinds `OutOfBounds` and `Misaligned` are
    /// never produced under this flag.
    pub const UNCHECKED: Mode = Mode(1 << 2);

    /// Request the lazy "cast" deserialize entry point
    /// ([`crate::access`]): no eager validation walk, every dereference
    /// resolves self-relatively on demand.
    pub const CAST: Mode = Mode(1 << 3);

    /// Force an eager, fully recursive bounds/alignment walk of the whole
    /// reachable graph even under [`Mode::CAST`] (normally the cast path
    /// performs no walk at all, leaving validation to each accessor call).
    pub const DEEP_CHECK: Mode = Mode(1 << 4);

    /// Whether `self` has every bit of `other` set.
    #[inline]
    pub const fn contains(self, other: Mode) -> bool {
        self.0 & other.0 == other.0
    }

    /// The union of `self` and `other`.
    #[inline]
    pub const fn union(self, other: Mode) -> Mode {
        Mode(self.0 | other.0)
    }
}

impl BitOr for Mode {
    type Output = Mode;

    fn bitor(self, rhs: Mode) -> Mode {
        self.union(rhs)
    }
}

impl BitOrAssign for Mode {
    fn bitor_assign(&mut self, rhs: Mode) {
        *self = self.union(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_and_contains() {
        let mode = Mode::WITH_VERSION | Mode::WITH_INTEGRITY;
        assert!(mode.contains(Mode::WITH_VERSION));
        assert!(mode.contains(Mode::WITH_INTEGRITY));
        assert!(!mode.contains(Mode::UNCHECKED));
    }

    #[test]
    fn none_contains_nothing_but_itself() {
        assert!(Mode::NONE.contains(Mode::NONE));
        assert!(!Mode::NONE.contains(Mode::CAST));
    }
}
