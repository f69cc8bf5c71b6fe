//! Procedural derive macros for `imprint`.
//!
//! Structural decomposition without a runtime schema is the substitute
//! for reflection over aggregates. Rust has no compile-time aggregate
//! reflection, so these three derives generate, for a
//! `#[derive(Archive, Serialize, Deserialize)]` struct, exactly the code
//! this crate's hand-written container impls already show by example:
//! one archived field per source field, and one call into each field's
//! own impl, in declaration order.

mod archive;
mod deser;
mod fields;
mod ser;

extern crate proc_macro;

use syn::{parse_macro_input, DeriveInput};

/// Generates an `Archived` struct whose fields are each source field's own
/// `Archived` type, plus an `Archive` impl pointing at it.
#[proc_macro_derive(Archive)]
pub fn derive_archive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match archive::expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Generates a `Serialize<S>` impl that writes each field into the
/// archived struct's corresponding offset, computed via
/// [`imprint::field_offset!`](imprint::field_offset).
#[proc_macro_derive(Serialize)]
pub fn derive_serialize(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match ser::expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Generates a `Deserialize` impl that validates each field's archived
/// counterpart.
#[proc_macro_derive(Deserialize)]
pub fn derive_deserialize(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match deser::expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
