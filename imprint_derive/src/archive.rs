//! `#[derive(Archive)]`: generates the archived struct and its `Archive`
//! impl, building generics up by hand field-by-field and requiring each
//! field's own type to implement `Archive`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::fields::{archived_ident, generic_parts, member_tokens, struct_layout, Shape};

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let layout = struct_layout(input)?;
    let name = &input.ident;
    let archived = archived_ident(name);
    let (generic_params, generic_args, generic_predicates) = generic_parts(&input.generics);

    let field_bounds = layout.fields.iter().map(|f| {
        let ty = &f.ty;
        quote! { #ty: ::imprint::Archive, }
    });
    let field_bounds = quote! { #(#field_bounds)* };

    let archived_def = match layout.shape {
        Shape::Named => {
            let decls = layout.fields.iter().map(|f| {
                let member = member_tokens(f);
                let ty = &f.ty;
                quote! { pub #member: <#ty as ::imprint::Archive>::Archived }
            });
            quote! {
                #[repr(C)]
                pub struct #archived<#generic_params>
                where
                    #generic_predicates
                    #field_bounds
                {
                    #(#decls,)*
                }
            }
        }
        Shape::Unnamed => {
            let decls = layout.fields.iter().map(|f| {
                let ty = &f.ty;
                quote! { pub <#ty as ::imprint::Archive>::Archived }
            });
            quote! {
                #[repr(C)]
                pub struct #archived<#generic_params>(#(#decls,)*)
                where
                    #generic_predicates
                    #field_bounds;
            }
        }
        Shape::Unit => {
            quote! {
                #[repr(C)]
                pub struct #archived<#generic_params>
                where
                    #generic_predicates;
            }
        }
    };

    Ok(quote! {
        #archived_def

        impl<#generic_params> ::imprint::Archive for #name<#generic_args>
        where
            #generic_predicates
            #field_bounds
        {
            type Archived = #archived<#generic_args>;
        }
    })
}
