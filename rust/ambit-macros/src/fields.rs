//! Fields derive macro implementation.
//!
//! Generates one tag type per named field plus `HasField` and `HasPosition`
//! implementations, so that capability accessors can address a field either
//! by name or by declaration index.
//!
//! # Example
//!
//! ```rust,ignore
//! #[derive(Fields)]
//! pub struct Counters {
//!     hits: AtomicUsize,
//!     misses: AtomicUsize,
//! }
//! ```
//!
//! Generates:
//!
//! ```rust,ignore
//! #[allow(non_camel_case_types)]
//! pub mod counters {
//!     pub enum hits {}
//!     pub enum misses {}
//! }
//!
//! impl ::ambit_capability::HasField<counters::hits> for Counters {
//!     type Type = AtomicUsize;
//!     fn field(&self) -> &AtomicUsize { &self.hits }
//!     fn field_mut(&mut self) -> &mut AtomicUsize { &mut self.hits }
//! }
//!
//! impl ::ambit_capability::HasPosition<0> for Counters {
//!     type Type = AtomicUsize;
//!     fn position(&self) -> &AtomicUsize { &self.hits }
//!     fn position_mut(&mut self) -> &mut AtomicUsize { &mut self.hits }
//! }
//! // ... and the same for `misses` / position 1
//! ```

use convert_case::{Case, Casing};
use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, Ident, Index, Member, parse_macro_input};

/// Implementation used by `#[derive(Fields)]`.
pub fn generate(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match generate_fields(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// Parse `#[fields(module = name)]`, falling back to the struct name in
/// snake case.
fn module_name(input: &DeriveInput) -> syn::Result<Ident> {
    let mut module = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("fields") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("module") {
                module = Some(meta.value()?.parse::<Ident>()?);
                Ok(())
            } else {
                Err(meta.error("unknown fields attribute parameter"))
            }
        })?;
    }

    match module {
        Some(module) => Ok(module),
        None => default_module_name(&input.ident),
    }
}

/// The struct name in snake case, as a raw identifier when it is a keyword
/// (`struct Ref` gets `mod r#ref`).
fn default_module_name(struct_name: &Ident) -> syn::Result<Ident> {
    let name = struct_name.to_string().to_case(Case::Snake);
    let span = struct_name.span();
    match name.as_str() {
        "crate" | "self" | "super" => Err(syn::Error::new_spanned(
            struct_name,
            format!(
                "`{name}` cannot name the field tag module of `{struct_name}`, \
                 use #[fields(module = ..)]"
            ),
        )),
        // Reserved in edition 2024.
        "gen" => Ok(Ident::new_raw(&name, span)),
        _ if syn::parse_str::<Ident>(&name).is_ok() => Ok(Ident::new(&name, span)),
        _ => Ok(Ident::new_raw(&name, span)),
    }
}

fn generate_fields(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let visibility = &input.vis;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        syn::Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "#[derive(Fields)] can only be used on structs",
            ));
        }
    };

    // Tuple and unit structs have nothing to name, so no tag module.
    let module = match fields {
        syn::Fields::Named(_) => Some(module_name(input)?),
        _ => None,
    };

    let mut tags = Vec::new();
    let mut impls = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let field_ty = &field.ty;
        let member = match &field.ident {
            Some(name) => Member::Named(name.clone()),
            None => Member::Unnamed(Index::from(index)),
        };

        if let (Some(name), Some(module)) = (&field.ident, &module) {
            let doc = format!("Tag selecting the `{name}` field of `{struct_name}`.");
            tags.push(quote! {
                #[doc = #doc]
                pub enum #name {}
            });

            impls.push(quote! {
                #[automatically_derived]
                impl #impl_generics ::ambit_capability::HasField<#module::#name>
                    for #struct_name #ty_generics
                #where_clause
                {
                    type Type = #field_ty;

                    fn field(&self) -> &Self::Type {
                        &self.#member
                    }

                    fn field_mut(&mut self) -> &mut Self::Type {
                        &mut self.#member
                    }
                }
            });
        }

        let position = proc_macro2::Literal::usize_unsuffixed(index);
        impls.push(quote! {
            #[automatically_derived]
            impl #impl_generics ::ambit_capability::HasPosition<#position>
                for #struct_name #ty_generics
            #where_clause
            {
                type Type = #field_ty;

                fn position(&self) -> &Self::Type {
                    &self.#member
                }

                fn position_mut(&mut self) -> &mut Self::Type {
                    &mut self.#member
                }
            }
        });
    }

    let tag_module = if tags.is_empty() {
        quote! {}
    } else {
        let doc = format!("Field tags of `{struct_name}`, generated by `#[derive(Fields)]`.");
        quote! {
            #[doc = #doc]
            #[allow(non_camel_case_types)]
            #visibility mod #module {
                #(#tags)*
            }
        }
    };

    Ok(quote! {
        #tag_module
        #(#impls)*
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn it_names_the_tag_module_after_the_struct() {
        let input: DeriveInput = parse_quote! {
            struct ServerConfig { port: u16 }
        };
        assert_eq!(module_name(&input).unwrap().to_string(), "server_config");
    }

    #[test]
    fn it_uses_a_raw_identifier_for_keyword_names() {
        let input: DeriveInput = parse_quote! {
            struct Ref { count: u32 }
        };
        assert_eq!(module_name(&input).unwrap().to_string(), "r#ref");

        let tokens = generate_fields(&input).unwrap();
        assert!(syn::parse2::<syn::File>(tokens).is_ok());
    }

    #[test]
    fn it_asks_for_an_explicit_module_when_no_identifier_fits() {
        let input: DeriveInput = parse_quote! {
            struct Super { value: u8 }
        };
        let error = generate_fields(&input).unwrap_err();
        assert!(error.to_string().contains("#[fields(module = ..)]"));

        let input: DeriveInput = parse_quote! {
            #[fields(module = parent)]
            struct Super { value: u8 }
        };
        assert!(generate_fields(&input).is_ok());
    }

    #[test]
    fn it_needs_no_module_for_tuple_structs() {
        let input: DeriveInput = parse_quote! {
            struct Super(u8, u8);
        };
        assert!(generate_fields(&input).is_ok());
    }
}
