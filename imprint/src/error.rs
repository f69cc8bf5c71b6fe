//! The closed error domain for every fallible operation in this crate.

use thiserror::Error;

/// Everything that can go wrong while serializing or deserializing an
/// object graph.
///
/// This maps one-to-one onto the error kinds enumerated for the engine:
/// version mismatches, integrity mismatches, out-of-bounds pointers,
/// alignment violations, sink failures, and graph-shape violations.
#[derive(Debug, Error)]
pub enum Error {
    /// The envelope's type hash did not match the type hash of the
    /// requested root type.
    #[error("version mismatch: expected type hash {expected:#018x}, found {found:#018x}")]
    VersionMismatch {
        /// The type hash baked into the archive being read.
        found: u64,
        /// The type hash of the root type requested by the caller.
        expected: u64,
    },

    /// The envelope's content hash did not match the hash of the payload
    /// bytes.
    #[error("integrity mismatch: payload hash does not match envelope")]
    IntegrityMismatch,

    /// A resolved pointer, or the region it claims to address, falls
    /// outside the bounds of the buffer.
    #[error("out-of-bounds pointer: offset {offset} size {size} exceeds buffer of length {buffer_len}")]
    OutOfBounds {
        /// Byte offset from the start of the buffer the pointer resolved to.
        offset: isize,
        /// Size in bytes of the region the pointer claims to address.
        size: usize,
        /// Total length of the buffer being validated against.
        buffer_len: usize,
    },

    /// A resolved pointer is not aligned to its target type's alignment
    /// requirement.
    #[error("misaligned pointer: offset {offset} is not aligned to {align}")]
    Misaligned {
        /// Byte offset from the start of the buffer the pointer resolved to.
        offset: isize,
        /// Required alignment, in bytes.
        align: usize,
    },

    /// The underlying output sink failed (I/O error during `append` or
    /// `patch`, or while mapping/reading a file).
    #[error("sink failure: {0}")]
    Sink(#[from] std::io::Error),

    /// A `Unique<T>`-style owning pointer's pointee was reachable through
    /// more than one owning handle.
    #[error("graph-shape violation: address {0:#x} is owned by more than one unique handle")]
    SharedOwnership(usize),

    /// A non-owning `OPtr` referenced a source address that no
    /// `Box`/`Unique` handle reachable from the root ever emitted.
    #[error("graph-shape violation: address {0:#x} is referenced but owned by no reachable handle")]
    DanglingReference(usize),

    /// The self-relative delta between a pointer's storage slot and its
    /// target overflowed the addressable range.
    #[error("offset overflow: distance between slot and target does not fit in the offset type")]
    OffsetOverflow,
}
