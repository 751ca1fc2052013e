//! Proc macros for Standout Inspect.
//!
//! # Available Macros
//!
//! - [`Inspect`] - Implement `Inspect` and `Record` for structs with named fields
//!
//! The generated code refers to `::standout_inspect`, so use the derive through the
//! re-export in `standout-inspect` (enabled by its default `macros` feature).
//!
//! For working examples, see `standout-inspect/tests/derive.rs`.

mod inspect;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `Inspect` and `Record` for a struct with named fields.
///
/// Each field becomes a record field. Its visibility tag follows the field's Rust
/// visibility unless overridden.
///
/// | Rust visibility | Tag |
/// |-----------------|-----|
/// | `pub` | public (`+`) |
/// | `pub(crate)`, `pub(super)`, `pub(in path)` | protected (`#`) |
/// | private | private (`-`) |
///
/// Every field type must implement `Inspect`. Type parameters get an `Inspect`
/// bound.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `skip` | Leave the field out |
/// | `rename = "..."` | Show the field under another name |
/// | `visibility = "public" \| "protected" \| "private"` | Override the visibility tag |
///
/// # Container Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `rename = "..."` | Class name shown in the header (default: the struct name) |
/// | `display` | Use the `Display` impl as the record preview |
///
/// # Example
///
/// ```ignore
/// use standout_inspect::Inspect;
///
/// #[derive(Inspect)]
/// #[inspect(rename = "Account", display)]
/// struct User {
///     pub name: String,
///     pub(crate) role: String,
///     #[inspect(skip)]
///     password_hash: String,
///     #[inspect(rename = "uid", visibility = "public")]
///     id: u64,
/// }
///
/// impl std::fmt::Display for User {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "{} ({})", self.name, self.role)
///     }
/// }
/// ```
#[proc_macro_derive(Inspect, attributes(inspect))]
pub fn inspect_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    inspect::inspect_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
