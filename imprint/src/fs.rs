//! Filesystem convenience layer: thin adapters over the core protocol
//! that write a buffer to, and read one back from, a path on disk. Gated
//! behind the `fs` feature so the
//! core crate has no mandatory dependency on `memmap2`.
//!
//! This is the only module in the crate that logs: `tracing` spans mark
//! each I/O boundary (open, mmap, read, write), while `ser`/`de` stay
//! allocation- and log-free on the hot path.

use std::fs::OpenOptions;
use std::ops::Deref;
use std::path::Path;

use memmap2::{Mmap, MmapMut};
use tracing::instrument;

use crate::align::AlignedVec;
use crate::error::Error;
use crate::mode::Mode;
use crate::ser::Tracker as SerTracker;
use crate::traits::{Deserialize, Serialize};

/// Owns an [`AlignedVec`] read in full from disk, paired with a typed,
/// validated pointer into it.
///
/// Returned by [`read_file`]. The buffer and the pointer it backs travel
/// together so the pointer can never outlive its storage. The buffer is
/// read into an `AlignedVec` rather than a plain `Vec<u8>`, since a plain
/// `Vec<u8>`'s base pointer is only byte-aligned and every in-place read
/// of an archived field relies on the buffer start carrying the
/// alignment guarantee described in `align.rs`.
pub struct OwnedArchive<T: Deserialize> {
    bytes: AlignedVec,
    root: usize,
    _marker: core::marker::PhantomData<T>,
}

impl<T: Deserialize> OwnedArchive<T> {
    /// The validated root archived value.
    pub fn get(&self) -> &T::Archived {
        unsafe { &*(self.bytes.as_ptr().add(self.root) as *const T::Archived) }
    }
}

impl<T: Deserialize> Deref for OwnedArchive<T> {
    type Target = T::Archived;

    fn deref(&self) -> &T::Archived {
        self.get()
    }
}

/// A read-only memory mapping of a file, paired with a typed, validated
/// pointer into it.
///
/// Returned by [`read_file_mmap`]. Keeping the [`Mmap`] alive for as long
/// as the pointer is what makes this sound, since dropping it would unmap
/// the pages the archived value lives in.
pub struct MappedArchive<T: Deserialize> {
    mmap: Mmap,
    root: usize,
    _marker: core::marker::PhantomData<T>,
}

impl<T: Deserialize> MappedArchive<T> {
    /// The validated root archived value.
    pub fn get(&self) -> &T::Archived {
        unsafe { &*(self.mmap.as_ptr().add(self.root) as *const T::Archived) }
    }
}

impl<T: Deserialize> Deref for MappedArchive<T> {
    type Target = T::Archived;

    fn deref(&self) -> &T::Archived {
        self.get()
    }
}

/// Serializes `value` and writes it to `path` through a memory-mapped
/// file opened for writing.
#[instrument(skip(value), fields(path = %path.as_ref().display()))]
pub fn write_file<T>(path: impl AsRef<Path>, value: &T, mode: Mode) -> Result<(), Error>
where
    T: Serialize<SerTracker>,
{
    let path = path.as_ref();
    let bytes = crate::api::to_bytes(value, mode)?;
    let file = OpenOptions::new().read(true).write(true).create(true).truncate(true).open(path)?;
    file.set_len(bytes.len() as u64)?;
    tracing::debug!(bytes = bytes.len(), "mapping output file");
    let mut mmap = unsafe { MmapMut::map_mut(&file)? };
    mmap.copy_from_slice(&bytes);
    mmap.flush()?;
    Ok(())
}

/// Reads `path` into an owned buffer and validates it, returning an
/// [`OwnedArchive`] pairing the bytes with a typed root pointer.
#[instrument(fields(path = %path.as_ref().display()))]
pub fn read_file<T>(path: impl AsRef<Path>, mode: Mode) -> Result<OwnedArchive<T>, Error>
where
    T: Deserialize,
{
    let path = path.as_ref();
    let mut file = OpenOptions::new().read(true).open(path)?;
    let len = file.metadata()?.len() as usize;
    let mut bytes = AlignedVec::with_capacity(len);
    std::io::copy(&mut file, &mut bytes)?;
    tracing::debug!(bytes = bytes.len(), "read file into owned, aligned buffer");
    let root = locate_and_validate::<T>(&bytes, mode)?;
    Ok(OwnedArchive { bytes, root, _marker: core::marker::PhantomData })
}

/// Memory-maps `path` read-only and validates it in place, returning a
/// [`MappedArchive`] pairing the mapping with a typed root pointer.
#[instrument(fields(path = %path.as_ref().display()))]
pub fn read_file_mmap<T>(path: impl AsRef<Path>, mode: Mode) -> Result<MappedArchive<T>, Error>
where
    T: Deserialize,
{
    let path = path.as_ref();
    let file = OpenOptions::new().read(true).open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    tracing::debug!(bytes = mmap.len(), "mapped file read-only");
    let root = locate_and_validate::<T>(&mmap, mode)?;
    Ok(MappedArchive { mmap, root, _marker: core::marker::PhantomData })
}

fn locate_and_validate<T: Deserialize>(bytes: &[u8], mode: Mode) -> Result<usize, Error> {
    let (header, payload_end) = crate::envelope::validate::<T>(bytes, mode)?;
    let root = crate::envelope::root_offset(mode, core::mem::align_of::<T::Archived>());
    let root_size = core::mem::size_of::<T::Archived>();
    if root < header || root + root_size > payload_end {
        return Err(Error::OutOfBounds { offset: root as isize, size: root_size, buffer_len: bytes.len() });
    }
    if !mode.contains(Mode::UNCHECKED) {
        let mut dctx = crate::de::Tracker::new(bytes.as_ptr(), bytes.len(), mode);
        let archived = unsafe { &*(bytes.as_ptr().add(root) as *const T::Archived) };
        T::deserialize(archived, &mut dctx)?;
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_file_round_trips() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("imprint-fs-test-{}.bin", std::process::id()));
        write_file(&path, &vec![1u32, 2, 3], Mode::NONE).unwrap();
        let archive: OwnedArchive<Vec<u32>> = read_file(&path, Mode::NONE).unwrap();
        assert_eq!(&archive[..], &[1, 2, 3]);
        let mapped: MappedArchive<Vec<u32>> = read_file_mmap(&path, Mode::NONE).unwrap();
        assert_eq!(&mapped[..], &[1, 2, 3]);
        let _ = std::fs::remove_file(&path);
    }
}
