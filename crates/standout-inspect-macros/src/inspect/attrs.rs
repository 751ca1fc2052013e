//! Attribute parsing for the Inspect derive macro.
//!
//! Parses `#[inspect(...)]` on the struct (container attributes) and on its
//! fields (field attributes).

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Lit, LitStr, Meta, Result, Token,
};

/// Visibility tag of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityTag {
    Public,
    Protected,
    Private,
}

impl VisibilityTag {
    /// Parse a tag from a string literal.
    pub fn from_lit(s: &str, span: Span) -> Result<Self> {
        match s {
            "public" => Ok(VisibilityTag::Public),
            "protected" => Ok(VisibilityTag::Protected),
            "private" => Ok(VisibilityTag::Private),
            other => Err(Error::new(
                span,
                format!(
                    "unknown visibility: '{}'. Expected one of: public, protected, private",
                    other
                ),
            )),
        }
    }

    /// The tag implied by a field's Rust visibility.
    pub fn of(vis: &syn::Visibility) -> Self {
        match vis {
            syn::Visibility::Public(_) => VisibilityTag::Public,
            syn::Visibility::Restricted(_) => VisibilityTag::Protected,
            syn::Visibility::Inherited => VisibilityTag::Private,
        }
    }

    /// Name of the matching `Visibility` variant.
    pub fn variant(self) -> &'static str {
        match self {
            VisibilityTag::Public => "Public",
            VisibilityTag::Protected => "Protected",
            VisibilityTag::Private => "Private",
        }
    }
}

fn lit_str(expr: &Expr, what: &str) -> Result<LitStr> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.clone()),
        other => Err(Error::new(
            other.span(),
            format!("{} must be a string literal", what),
        )),
    }
}

/// Field-level attributes from `#[inspect(...)]`.
#[derive(Debug, Clone, Default)]
pub struct FieldAttr {
    /// Leave this field out of the record.
    pub skip: bool,
    /// Display name (default: field name).
    pub rename: Option<String>,
    /// Visibility override (default: from the Rust visibility).
    pub visibility: Option<VisibilityTag>,
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => attr.skip = true,
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    attr.rename = Some(lit_str(&nv.value, "rename")?.value());
                }
                Meta::NameValue(nv) if nv.path.is_ident("visibility") => {
                    let s = lit_str(&nv.value, "visibility")?;
                    attr.visibility = Some(VisibilityTag::from_lit(&s.value(), s.span())?);
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown inspect attribute. Expected: skip, rename = \"...\", or visibility = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Container-level attributes from `#[inspect(...)]`.
#[derive(Debug, Clone, Default)]
pub struct ContainerAttr {
    /// Class name shown in the header (default: struct name).
    pub rename: Option<String>,
    /// Use `Display` as the record preview.
    pub display: bool,
}

impl Parse for ContainerAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = ContainerAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("display") => attr.display = true,
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    attr.rename = Some(lit_str(&nv.value, "rename")?.value());
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown inspect attribute. Expected: display or rename = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Extract `#[inspect(...)]` from a field's attributes.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    for attr in attrs {
        if attr.path().is_ident("inspect") {
            return attr.parse_args::<FieldAttr>();
        }
    }
    Ok(FieldAttr::default())
}

/// Extract `#[inspect(...)]` from the struct's attributes.
pub fn parse_container_attrs(attrs: &[Attribute]) -> Result<ContainerAttr> {
    for attr in attrs {
        if attr.path().is_ident("inspect") {
            return attr.parse_args::<ContainerAttr>();
        }
    }
    Ok(ContainerAttr::default())
}
