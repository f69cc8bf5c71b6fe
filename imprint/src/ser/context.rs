//! The serialization context: an append-only output buffer plus the
//! bookkeeping a full traversal needs (`visited`, `pending`, and the
//! `owned` set used to detect graph-shape violations on `Box`/`Unique`).

use hashbrown::{HashMap, HashSet};

use crate::align::AlignedVec;
use crate::error::Error;
use crate::hash::FxBuildHasher;
use crate::offset::signed_offset;
use crate::traits::Fallible;

use super::Serializer;

/// The serializer-side serialization context.
///
/// `buf` is the append-only output buffer. `visited` maps a source
/// address already emitted to the buffer offset its bytes start at.
/// `pending` holds `(source_addr, slot_pos)` pairs for pointer slots
/// written before their target was visited; `drain_pending` resolves them
/// once the whole graph has been traversed. `owned` tracks which source
/// addresses are already claimed by a `Box`/`Unique` owner, so that a
/// second owner reaching the same address is rejected as a graph-shape
/// violation rather than silently double-emitted.
pub struct Tracker {
    buf: AlignedVec,
    visited: HashMap<usize, usize, FxBuildHasher>,
    pending: Vec<(usize, usize)>,
    owned: HashSet<usize, FxBuildHasher>,
}

impl Tracker {
    /// Constructs an empty context with no preallocated capacity.
    pub fn new() -> Self {
        Self {
            buf: AlignedVec::new(),
            visited: HashMap::default(),
            pending: Vec::new(),
            owned: HashSet::default(),
        }
    }

    /// Constructs an empty context whose buffer has preallocated capacity
    /// for at least `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: AlignedVec::with_capacity(capacity),
            visited: HashMap::default(),
            pending: Vec::new(),
            owned: HashSet::default(),
        }
    }

    /// Consumes the context, returning the finished output buffer.
    ///
    /// Callers must have already called [`Serializer::drain_pending`]
    /// (the root serialization procedure does this before appending the
    /// envelope trailer).
    pub fn into_buf(self) -> AlignedVec {
        self.buf
    }

    /// The bytes written so far. Used by the envelope to hash the payload
    /// region before appending the integrity trailer.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Fallible for Tracker {
    type Error = Error;
}

impl Serializer for Tracker {
    fn pos(&self) -> usize {
        self.buf.len()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn pad(&mut self, count: usize) -> Result<(), Error> {
        self.buf.extend_zeroed(count);
        Ok(())
    }

    fn overwrite(&mut self, offset: usize, bytes: &[u8]) -> Result<(), Error> {
        self.buf.patch(offset, bytes);
        Ok(())
    }

    fn visited(&self, addr: usize) -> Option<usize> {
        self.visited.get(&addr).copied()
    }

    fn mark_visited(&mut self, addr: usize, pos: usize) {
        self.visited.insert(addr, pos);
    }

    fn is_owned(&self, addr: usize) -> bool {
        self.owned.contains(&addr)
    }

    fn mark_owned(&mut self, addr: usize) {
        self.owned.insert(addr);
    }

    fn defer(&mut self, addr: usize, slot_pos: usize) {
        self.pending.push((addr, slot_pos));
    }

    fn drain_pending(&mut self) -> Result<(), Error> {
        // Drain by index rather than `Vec::drain` so `self.visited` stays
        // borrowed only for the lookup, not for the whole loop.
        for i in 0..self.pending.len() {
            let (addr, slot_pos) = self.pending[i];
            let target_pos = self
                .visited
                .get(&addr)
                .copied()
                .ok_or(Error::DanglingReference(addr))?;
            let delta = signed_offset(slot_pos, target_pos)?;
            self.buf.patch(slot_pos, &delta.to_le_bytes());
        }
        self.pending.clear();
        Ok(())
    }
}
