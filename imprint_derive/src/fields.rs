//! Shared struct-shape inspection used by all three derive macros.
//!
//! No external generics-handling crate: just manual iteration over
//! `Generics::params`/`type_params`/`where_clause` to build the three
//! token fragments (`generic_params`, `generic_args`, `generic_predicates`)
//! every generated impl needs.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Generics, Ident, Index, Member};

/// The shape of a struct's fields, mirroring `syn::Fields` but without its
/// payload (the fields themselves are collected into [`Field`] uniformly).
pub enum Shape {
    Named,
    Unnamed,
    Unit,
}

/// One field of the struct being derived on, identified by the member
/// syntax used to access it (`self.name` or `self.0`).
pub struct Field {
    pub member: Member,
    pub ty: syn::Type,
}

/// The struct's field shape plus its fields in declaration order.
pub struct Layout {
    pub shape: Shape,
    pub fields: Vec<Field>,
}

/// Inspects `input`, requiring it to be a struct. Enums are out of scope
/// for the derive; hand-write `Archive`/`Serialize`/`Deserialize` for
/// them, as this crate does for `Option<T>`.
pub fn struct_layout(input: &DeriveInput) -> syn::Result<Layout> {
    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "imprint's derive macros support structs only; \
                 archive enum fields by hand, as this crate does for `Option<T>`",
            ))
        }
    };
    let layout = match &data.fields {
        Fields::Named(named) => Layout {
            shape: Shape::Named,
            fields: named
                .named
                .iter()
                .map(|f| Field {
                    member: Member::Named(f.ident.clone().expect("named field has an ident")),
                    ty: f.ty.clone(),
                })
                .collect(),
        },
        Fields::Unnamed(unnamed) => Layout {
            shape: Shape::Unnamed,
            fields: unnamed
                .unnamed
                .iter()
                .enumerate()
                .map(|(i, f)| Field {
                    member: Member::Unnamed(Index::from(i)),
                    ty: f.ty.clone(),
                })
                .collect(),
        },
        Fields::Unit => Layout { shape: Shape::Unit, fields: Vec::new() },
    };
    Ok(layout)
}

/// The name of the archived struct generated for a type named `name`:
/// `"Archived" + name`.
pub fn archived_ident(name: &Ident) -> Ident {
    Ident::new(&format!("Archived{name}"), name.span())
}

/// Tokens referring to a field by its member syntax: `name` for a named
/// field, `0`/`1`/... for a tuple field.
pub fn member_tokens(field: &Field) -> TokenStream {
    match &field.member {
        Member::Named(ident) => quote! { #ident },
        Member::Unnamed(index) => quote! { #index },
    }
}

/// Splits `generics` into the three comma-terminated token fragments a
/// generated `impl`/struct header needs: declared params (with their own
/// bounds), bare argument names, and the user's own `where` predicates.
pub fn generic_parts(generics: &Generics) -> (TokenStream, TokenStream, TokenStream) {
    let params = generics.params.iter().map(|p| quote! { #p, });
    let params = quote! { #(#params)* };

    let args = generics.type_params().map(|p| {
        let name = &p.ident;
        quote! { #name, }
    });
    let args = quote! { #(#args)* };

    let predicates = match &generics.where_clause {
        Some(clause) => {
            let preds = clause.predicates.iter().map(|p| quote! { #p, });
            quote! { #(#preds)* }
        }
        None => quote! {},
    };

    (params, args, predicates)
}
