//! Variants derive macro implementation.
//!
//! Generates `Inject<Payload>` for each single-field tuple variant of an
//! error enum, which is the injection/projection pair the error capability
//! uses to narrow a context's fault type.

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, Fields, parse_macro_input};

/// Implementation used by `#[derive(Variants)]`.
pub fn generate(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match generate_variants(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// Parse `#[variant(skip)]`, rejecting any other parameter.
fn is_skipped(variant: &syn::Variant) -> syn::Result<bool> {
    let mut skip = false;
    for attr in &variant.attrs {
        if !attr.path().is_ident("variant") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unknown variant attribute parameter"))
            }
        })?;
    }
    Ok(skip)
}

fn generate_variants(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let enum_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let variants = match &input.data {
        syn::Data::Enum(data) => &data.variants,
        _ => {
            return Err(syn::Error::new_spanned(
                enum_name,
                "#[derive(Variants)] can only be used on enums",
            ));
        }
    };

    let mut impls = Vec::new();

    for variant in variants {
        if is_skipped(variant)? {
            continue;
        }

        // Only `Variant(Payload)` has an unambiguous payload to project.
        let payload = match &variant.fields {
            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => &fields.unnamed[0].ty,
            _ => continue,
        };
        let variant_name = &variant.ident;

        impls.push(quote! {
            #[automatically_derived]
            impl #impl_generics ::ambit_capability::Inject<#payload>
                for #enum_name #ty_generics
            #where_clause
            {
                fn inject(error: #payload) -> Self {
                    Self::#variant_name(error)
                }

                #[allow(unreachable_patterns)]
                fn project(self) -> ::core::result::Result<#payload, Self> {
                    match self {
                        Self::#variant_name(error) => ::core::result::Result::Ok(error),
                        other => ::core::result::Result::Err(other),
                    }
                }
            }
        });
    }

    Ok(quote! {
        #(#impls)*
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn it_injects_every_single_field_variant() {
        let input: DeriveInput = parse_quote! {
            enum Fault {
                Parse(ParseError),
                Io(IoError),
                Closed,
            }
        };
        let file = syn::parse2::<syn::File>(generate_variants(&input).unwrap()).unwrap();
        assert_eq!(file.items.len(), 2);
    }

    #[test]
    fn it_leaves_out_skipped_variants() {
        let input: DeriveInput = parse_quote! {
            enum Fault {
                Parse(ParseError),
                #[variant(skip)]
                Other(String),
            }
        };
        let file = syn::parse2::<syn::File>(generate_variants(&input).unwrap()).unwrap();
        assert_eq!(file.items.len(), 1);
    }

    #[test]
    fn it_rejects_unknown_variant_parameters() {
        let misspelled: DeriveInput = parse_quote! {
            enum Fault {
                #[variant(skp)]
                Other(String),
            }
        };
        let error = generate_variants(&misspelled).unwrap_err();
        assert!(error.to_string().contains("unknown variant attribute parameter"));

        let extra: DeriveInput = parse_quote! {
            enum Fault {
                #[variant(skip, x)]
                Other(String),
            }
        };
        assert!(generate_variants(&extra).is_err());
    }
}
