//! `#[derive(Deserialize)]`: generates a `Deserialize` impl that walks
//! into each field's archived counterpart, validating it. No patching
//! happens here; see `crate::traits::Deserialize`'s doc comment for why
//! this is a pure validation walk.

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::fields::{generic_parts, member_tokens, struct_layout};

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let layout = struct_layout(input)?;
    let name = &input.ident;
    let (generic_params, generic_args, generic_predicates) = generic_parts(&input.generics);

    let field_bounds = layout.fields.iter().map(|f| {
        let ty = &f.ty;
        quote! { #ty: ::imprint::Deserialize, }
    });
    let field_bounds = quote! { #(#field_bounds)* };

    let calls = layout.fields.iter().map(|f| {
        let member = member_tokens(f);
        let ty = &f.ty;
        quote! {
            <#ty as ::imprint::Deserialize>::deserialize(&archived.#member, deserializer)?;
        }
    });

    Ok(quote! {
        impl<#generic_params> ::imprint::Deserialize for #name<#generic_args>
        where
            #generic_predicates
            #field_bounds
        {
            fn deserialize<D: ::imprint::de::Deserializer + ?Sized>(
                archived: &Self::Archived,
                deserializer: &mut D,
            ) -> ::core::result::Result<(), D::Error> {
                #(#calls)*
                Ok(())
            }
        }
    })
}
