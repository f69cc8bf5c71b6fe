//! The core trait trio: `Archive`, `Serialize`, `Deserialize`, plus the
//! `Fallible` trait that ties a (de)serializer to its error type.
//!
//! There is no runtime type registry and no codegen step: a type opts in
//! either by implementing these traits by hand (as this crate does for
//! every scalar, `String`, `Vec<T>`, `Box<T>`, `Option<T>`, and `*const T`),
//! or by deriving them with `#[derive(Archive, Serialize, Deserialize)]`,
//! which expands to exactly the hand-written form for an aggregate: one
//! call into each field's own impl, in declaration order.
//!
//! Rather than a two-phase `Serialize::serialize` + `Archive::resolve`
//! split (build a resolver now, write bytes later), every type here writes
//! its own archived bytes directly into an already-reserved slot during
//! `serialize_into`. Forward-reference handling (`ser::Tracker`'s
//! pending-patch queue) needs the serializer context available at the
//! moment a slot's final position is known so it can register
//! `(origin_addr, slot_pos)`; splitting "compute a resolver" from "write
//! bytes" would put that registration in a method with no context
//! parameter. One direct pass keeps context and position together.

/// Associates a (de)serializer type with the error type it can fail with.
///
/// Every `Serializer` and `Deserializer` in this crate implements
/// `Fallible` with `Error = crate::error::Error`, but the trait is kept
/// separate from the others so that a field's `Serialize`/`Deserialize`
/// impl only needs to know "whatever error my context uses", not a
/// concrete type.
pub trait Fallible {
    /// The error type produced by this (de)serializer.
    type Error;
}

/// A type that has a corresponding archived (in-buffer) representation.
///
/// For scalar and `Copy`-without-pointers types, `Archived = Self`. For
/// containers (`String`, `Vec<T>`, `Box<T>`, `Option<T>`, `*const T`) and
/// for `#[derive(Archive)]` aggregates that contain them, `Archived` is a
/// distinct type whose pointer-bearing fields are `OPtr`-based instead of
/// real pointers.
pub trait Archive {
    /// The archived representation of this type.
    type Archived;
}

/// Serializes `self` into an already-reserved slot of a
/// [`crate::ser::Serializer`].
///
/// This is the serializer's per-type dispatch point: scalar types
/// implement it as a raw byte copy, containers implement it
/// with the custom cases (string payload, vector elements, box pointee,
/// pointer translation), and `#[derive(Serialize)]` aggregates implement it
/// by calling `serialize_into` on each field in declaration order, at that
/// field's offset within the parent's already-reserved region.
pub trait Serialize<S: Fallible + ?Sized>: Archive {
    /// Writes the archived form of `self` into the region of `serializer`'s
    /// buffer starting at `pos`, which has already been reserved (zeroed
    /// and aligned) for exactly `size_of::<Self::Archived>()` bytes by the
    /// caller.
    ///
    /// Implementations that own out-of-line data (a string's bytes, a
    /// vector's elements, a box's pointee) reserve a *new* region further
    /// in the buffer for that data from within this call, recurse into it,
    /// and finally write a pointer/length header at `pos` referencing it.
    fn serialize_into(&self, pos: usize, serializer: &mut S) -> Result<(), S::Error>;
}

/// Walks an archived value, validating its self-relative pointers.
///
/// Unlike `Serialize`, `Deserialize` does not build or mutate anything:
/// every `OPtr` resolves relative to its own storage slot on every
/// access, so there is no delta-to-address patch to perform.
/// `Deserialize::deserialize` exists
/// purely to walk the graph validating bounds/alignment per the active
/// [`crate::mode::Mode`], guarding against infinite recursion on cyclic
/// graphs via the deserializer's visited-slot set.
pub trait Deserialize: Archive {
    /// Validates `archived`, recursing into its fields/elements/pointee as
    /// appropriate, per `D`'s mode.
    fn deserialize<D: crate::de::Deserializer + ?Sized>(
        archived: &Self::Archived,
        deserializer: &mut D,
    ) -> Result<(), D::Error>;
}

/// The byte offset of `$field` within `$ty`, computed without reading any
/// (possibly uninitialized) memory: only pointer arithmetic on an
/// `addr_of!` projection through an uninitialized `$ty` is performed.
///
/// Used by hand-written container impls and by the `#[derive(Serialize)]`
/// macro's generated code to locate each field's slot within a parent's
/// already-reserved region.
#[macro_export]
macro_rules! field_offset {
    ($ty:ty, $field:tt) => {{
        let base = ::core::mem::MaybeUninit::<$ty>::uninit();
        let base_ptr = base.as_ptr();
        #[allow(unused_unsafe)]
        let field_ptr = unsafe { ::core::ptr::addr_of!((*base_ptr).$field) };
        (field_ptr as usize) - (base_ptr as usize)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    #[allow(dead_code)]
    struct Pair {
        a: u8,
        b: u32,
    }

    #[test]
    fn field_offset_matches_repr_c_layout() {
        assert_eq!(field_offset!(Pair, a), 0);
        assert_eq!(field_offset!(Pair, b), 4);
    }
}
