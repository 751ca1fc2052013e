//! Implementation of the `#[derive(Inspect)]` macro.
//!
//! Generates `Inspect` (a record node with no identity) and `Record` (field list,
//! field reads by name, optional `Display` preview) for a struct with named fields.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_quote, spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::{parse_container_attrs, parse_field_attrs, VisibilityTag};

/// Main implementation of the Inspect derive macro.
pub fn inspect_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Inspect can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Inspect can only be derived for structs",
            ))
        }
    };

    let container = parse_container_attrs(&input.attrs)?;
    let class_name = container
        .rename
        .unwrap_or_else(|| struct_name.to_string());

    let mut descriptors: Vec<TokenStream> = Vec::new();
    let mut read_arms: Vec<TokenStream> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        // Raw identifiers display without their `r#` prefix.
        let label = attrs
            .rename
            .unwrap_or_else(|| field_name.to_string().trim_start_matches("r#").to_string());
        let tag = attrs
            .visibility
            .unwrap_or_else(|| VisibilityTag::of(&field.vis));
        let variant = format_ident!("{}", tag.variant());

        descriptors.push(quote! {
            ::standout_inspect::FieldDescriptor::new(
                #label,
                ::standout_inspect::Visibility::#variant,
            )
        });
        read_arms.push(quote! {
            #label => visit(&self.#field_name),
        });
    }

    let preview = if container.display {
        quote! {
            fn preview(
                &self,
            ) -> ::std::option::Option<
                ::std::result::Result<::std::string::String, ::standout_inspect::ConversionError>,
            > {
                let mut text = ::std::string::String::new();
                match ::std::fmt::Write::write_fmt(&mut text, ::std::format_args!("{}", self)) {
                    ::std::result::Result::Ok(()) => {
                        ::std::option::Option::Some(::std::result::Result::Ok(text))
                    }
                    ::std::result::Result::Err(_) => ::std::option::Option::Some(
                        ::std::result::Result::Err(::standout_inspect::ConversionError::from(
                            "Display returned an error",
                        )),
                    ),
                }
            }
        }
    } else {
        TokenStream::new()
    };

    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(::standout_inspect::Inspect));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::standout_inspect::Inspect for #struct_name #ty_generics #where_clause {
            fn inspect(&self) -> ::standout_inspect::Node<'_> {
                ::standout_inspect::Node::record(self)
            }
        }

        impl #impl_generics ::standout_inspect::Record for #struct_name #ty_generics #where_clause {
            fn class_name(&self) -> ::std::borrow::Cow<'_, str> {
                ::std::borrow::Cow::Borrowed(#class_name)
            }

            fn fields(
                &self,
            ) -> ::std::result::Result<
                ::std::vec::Vec<::standout_inspect::FieldDescriptor>,
                ::standout_inspect::FieldError,
            > {
                ::std::result::Result::Ok(::std::vec![#(#descriptors),*])
            }

            fn read_field(
                &self,
                field: &::standout_inspect::FieldDescriptor,
                visit: &mut dyn ::std::ops::FnMut(&dyn ::standout_inspect::Inspect),
            ) -> ::std::result::Result<(), ::standout_inspect::FieldError> {
                match field.name() {
                    #(#read_arms)*
                    other => {
                        return ::std::result::Result::Err(
                            ::standout_inspect::FieldError::Missing(
                                ::std::string::ToString::to_string(other),
                            ),
                        )
                    }
                }
                ::std::result::Result::Ok(())
            }

            #preview
        }
    };

    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(input: DeriveInput) -> String {
        inspect_derive_impl(input).unwrap().to_string()
    }

    #[test]
    fn test_rejects_enums() {
        let input: DeriveInput = parse_quote! {
            enum Shape { Circle, Square }
        };
        let err = inspect_derive_impl(input).unwrap_err();
        assert!(err.to_string().contains("only be derived for structs"));
    }

    #[test]
    fn test_rejects_tuple_structs() {
        let input: DeriveInput = parse_quote! {
            struct Pair(u8, u8);
        };
        let err = inspect_derive_impl(input).unwrap_err();
        assert!(err.to_string().contains("named fields"));
    }

    #[test]
    fn test_visibility_tags_follow_rust_visibility() {
        let out = expand(parse_quote! {
            struct User {
                pub name: String,
                pub(crate) role: String,
                token: String,
            }
        });
        assert!(out.contains("\"name\" , :: standout_inspect :: Visibility :: Public"));
        assert!(out.contains("\"role\" , :: standout_inspect :: Visibility :: Protected"));
        assert!(out.contains("\"token\" , :: standout_inspect :: Visibility :: Private"));
    }

    #[test]
    fn test_skip_rename_and_override() {
        let out = expand(parse_quote! {
            struct User {
                #[inspect(skip)]
                hash: String,
                #[inspect(rename = "uid", visibility = "public")]
                id: u64,
            }
        });
        assert!(!out.contains("\"hash\""));
        assert!(out.contains("\"uid\" , :: standout_inspect :: Visibility :: Public"));
        assert!(out.contains("\"uid\" => visit (& self . id)"));
    }

    #[test]
    fn test_container_rename_and_display() {
        let out = expand(parse_quote! {
            #[inspect(rename = "Account", display)]
            struct User { pub name: String }
        });
        assert!(out.contains("Cow :: Borrowed (\"Account\")"));
        assert!(out.contains("fn preview"));
        assert!(out.contains("Display returned an error"));
    }

    #[test]
    fn test_no_preview_without_display() {
        let out = expand(parse_quote! {
            struct User { pub name: String }
        });
        assert!(!out.contains("fn preview"));
    }

    #[test]
    fn test_type_params_get_inspect_bound() {
        let out = expand(parse_quote! {
            struct Wrapper<T> { pub inner: T }
        });
        assert!(out.contains("impl < T : :: standout_inspect :: Inspect >"));
    }
}
