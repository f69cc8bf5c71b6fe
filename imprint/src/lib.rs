//! # imprint
//!
//! A zero-copy, relocatable binary (de)serialization engine for in-memory
//! object graphs on a single, trusted machine.
//!
//! The serialized byte stream is a faithful, contiguous, relocatable image
//! of the in-memory representation: pointers are stored as self-relative
//! offsets ([`OPtr`]) that resolve back to live pointers after nothing
//! more than a base-address fixup. The engine supports cyclic graphs,
//! shared references, strings, dynamic arrays, unique ownership handles
//! (`Box<T>`), and user-defined aggregates (via `#[derive(Archive,
//! Serialize, Deserialize)]`), and preserves each type's natural
//! alignment.
//!
//! ## Quick start
//!
//! ```
//! use imprint::{to_bytes, access, Mode};
//!
//! let bytes = to_bytes(&vec![1u32, 2, 3], Mode::NONE).unwrap();
//! let archived = access::<Vec<u32>>(&bytes, Mode::NONE).unwrap();
//! assert_eq!(&archived[..], &[1, 2, 3]);
//! ```
//!
//! ## Design
//!
//! Serialization walks the source graph once, emitting each reachable
//! object exactly once into a contiguous buffer and rewriting every
//! outgoing pointer as a self-relative offset ([`ser`]). Deserialization
//! is the symmetric validating walk ([`de`]); because every `OPtr`
//! resolves relative to its own storage slot, there is nothing to patch
//! ([`access`] and [`access_mut`] differ only in how eagerly they validate,
//! not in the bytes they hand back).
//!
//! ## Non-goals
//!
//! Portability across differing architectures (endianness, word size,
//! alignment rules); tolerance of data from untrusted sources beyond basic
//! bounds checking; schema evolution; cross-ecosystem interoperability.
//! Producer and consumer are assumed to share ABI and type layout. See
//! `DESIGN.md` for the full rationale behind these choices.

pub mod align;
pub mod api;
pub mod boxed;
pub mod de;
pub mod envelope;
pub mod error;
pub mod hash;
pub mod impls;
pub mod mode;
pub mod offset;
pub mod option;
pub mod ser;
pub mod string;
pub mod traits;
pub mod vec;

#[cfg(feature = "fs")]
pub mod fs;

pub use align::AlignedVec;
pub use api::{access, access_mut, to_bytes};
pub use boxed::ArchivedBox;
pub use error::Error;
pub use mode::Mode;
pub use offset::OPtr;
pub use option::ArchivedOption;
pub use string::ArchivedString;
pub use traits::{Archive, Deserialize, Fallible, Serialize};
pub use vec::ArchivedVec;

pub use imprint_derive::{Archive, Deserialize, Serialize};
