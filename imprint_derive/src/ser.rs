//! `#[derive(Serialize)]`: generates a `Serialize<S>` impl that calls
//! each field's own `serialize_into`, in declaration order, at that
//! field's offset within the archived struct, computed with
//! [`imprint::field_offset!`](imprint::field_offset).

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::fields::{archived_ident, generic_parts, member_tokens, struct_layout};

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let layout = struct_layout(input)?;
    let name = &input.ident;
    let archived = archived_ident(name);
    let (generic_params, generic_args, generic_predicates) = generic_parts(&input.generics);

    let field_bounds = layout.fields.iter().map(|f| {
        let ty = &f.ty;
        quote! { #ty: ::imprint::Serialize<S>, }
    });
    let field_bounds = quote! { #(#field_bounds)* };

    let calls = layout.fields.iter().map(|f| {
        let member = member_tokens(f);
        quote! {
            self.#member.serialize_into(
                pos + ::imprint::field_offset!(#archived<#generic_args>, #member),
                serializer,
            )?;
        }
    });

    Ok(quote! {
        impl<S: ::imprint::ser::Serializer + ?Sized, #generic_params> ::imprint::Serialize<S> for #name<#generic_args>
        where
            #generic_predicates
            #field_bounds
        {
            fn serialize_into(&self, pos: usize, serializer: &mut S) -> ::core::result::Result<(), S::Error> {
                #(#calls)*
                Ok(())
            }
        }
    })
}
