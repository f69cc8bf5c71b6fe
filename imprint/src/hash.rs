//! A small, fast, non-cryptographic 64-bit hash used for both the
//! structural type hash and the payload integrity hash in the envelope,
//! and as the hasher behind the serializer's visited-address map.

use core::hash::{BuildHasherDefault, Hasher};
use core::ops::BitXor as _;

/// A cross-platform 64-bit implementation of fxhash.
///
/// Used wherever the engine needs a cheap hash: the serializer's
/// address-keyed maps (`visited`, `owned`), the structural type hash
/// embedded by `Mode::WITH_VERSION`, and the payload hash embedded by
/// `Mode::WITH_INTEGRITY`.
#[derive(Default)]
pub struct FxHasher64 {
    hash: u64,
}

/// The `BuildHasher` for [`FxHasher64`], usable with `HashMap`/`HashSet`.
pub type FxBuildHasher = BuildHasherDefault<FxHasher64>;

#[inline]
fn hash_word(hash: u64, word: u64) -> u64 {
    const ROTATE: u32 = 5;
    const SEED: u64 = 0x51_7c_c1_b7_27_22_0a_95;

    hash.rotate_left(ROTATE).bitxor(word).wrapping_mul(SEED)
}

#[inline]
fn hash_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    let mut chunks = bytes.chunks_exact(8);
    for chunk in &mut chunks {
        let word = u64::from_le_bytes(chunk.try_into().unwrap());
        hash = hash_word(hash, word);
    }
    let mut rest = chunks.remainder();
    if rest.len() >= 4 {
        let (head, tail) = rest.split_at(4);
        hash = hash_word(hash, u32::from_le_bytes(head.try_into().unwrap()).into());
        rest = tail;
    }
    if rest.len() >= 2 {
        let (head, tail) = rest.split_at(2);
        hash = hash_word(hash, u16::from_le_bytes(head.try_into().unwrap()).into());
        rest = tail;
    }
    if let Some(&byte) = rest.first() {
        hash = hash_word(hash, byte.into());
    }
    hash
}

impl Hasher for FxHasher64 {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.hash = hash_bytes(self.hash, bytes);
    }

    #[inline]
    fn write_usize(&mut self, word: usize) {
        self.hash = hash_word(self.hash, word as u64);
    }

    #[inline]
    fn write_u64(&mut self, word: u64) {
        self.hash = hash_word(self.hash, word);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }
}

/// Hashes a byte slice in a single shot. Used for the envelope's content
/// hash (`Mode::WITH_INTEGRITY`).
pub fn hash_bytes_oneshot(bytes: &[u8]) -> u64 {
    let mut hasher = FxHasher64::default();
    hasher.write(bytes);
    hasher.finish()
}

/// A compile-time-stable structural hash of a root type.
///
/// Lacking reflection over a type's declared field shape, this hashes the
/// type's `core::any::type_name`, which changes whenever the type's path
/// or generic arguments change. It is a cheap ABI tripwire, not a
/// cryptographic or schema-evolution-aware digest; it's a cheap ABI
/// tripwire, nothing more.
pub fn type_hash<T: ?Sized>() -> u64 {
    hash_bytes_oneshot(core::any::type_name::<T>().as_bytes())
}
