//! # Standout Inspect - Structured Value Inspector
//!
//! `standout-inspect` renders arbitrary runtime values as readable, colored trees,
//! either as indented terminal text or as collapsible HTML. It never fails on the
//! value being inspected: reference cycles, very deep nesting, huge strings and
//! sequences, unreadable fields and types it does not know all render as inline
//! placeholders.
//!
//! ## Core Concepts
//!
//! - [`Inspect`]: the capability trait; any value that can be inspected yields a
//!   [`Node`] view of itself
//! - [`Kind`]: the semantic category a value is classified into
//! - [`Options`]: depth, string and sequence limits, field visibility filters
//! - [`TermRenderer`] / [`HtmlRenderer`]: the two output channels
//! - [`OutputMode`]: channel selection for the [`dump`] facade and [`inspect!`]
//!
//! ## Quick Start
//!
//! ```rust
//! use standout_inspect::{ChannelRenderer, TermRenderer};
//!
//! let scores = vec![("ada", 3), ("bob", 5)]
//!     .into_iter()
//!     .collect::<std::collections::BTreeMap<_, _>>();
//!
//! let output = TermRenderer::plain().render_to_string(&[&scores], None);
//! assert_eq!(
//!     output,
//!     "map(2) [\n  \"ada\" => int(3)\n  \"bob\" => int(5)\n]\n"
//! );
//! ```
//!
//! ## Object Graphs
//!
//! [`Object`] is a shared, mutable record for graphs with back references. A value
//! reached again while it is still being rendered shows as a recursion marker:
//!
//! ```rust
//! use standout_inspect::{ChannelRenderer, Object, TermRenderer, Visibility};
//!
//! let node = Object::new("Node").with("id", Visibility::Public, 1);
//! node.set("next", node.clone());
//!
//! let output = TermRenderer::plain().render_to_string(&[&node], None);
//! assert_eq!(
//!     output,
//!     "Node #1 {\n  +id: int(1)\n  +next: *RECURSION* Node #1\n}\n"
//! );
//! ```
//!
//! ## Derive
//!
//! With the default `macros` feature, structs can derive [`Inspect`]. Field
//! visibility follows the Rust visibility of each field:
//!
//! ```rust
//! # #[cfg(feature = "macros")]
//! # {
//! use standout_inspect::{ChannelRenderer, Inspect, TermRenderer};
//!
//! #[derive(Inspect)]
//! struct User {
//!     pub name: String,
//!     token: Option<String>,
//! }
//!
//! let user = User { name: "ada".into(), token: None };
//! let output = TermRenderer::plain().render_to_string(&[&user], None);
//! assert_eq!(output, "User {\n  +name: string(3) \"ada\"\n  -token: null\n}\n");
//! # }
//! ```
//!
//! ## The `inspect!` Macro
//!
//! [`inspect!`] writes values to stdout in the detected [`OutputMode`], recording
//! the file, line and module it was called from:
//!
//! ```rust,no_run
//! use standout_inspect::inspect;
//!
//! let config = vec!["debug", "verbose"];
//! inspect!(config);
//! ```

// Lets `::standout_inspect` paths generated by the derive resolve inside this crate.
extern crate self as standout_inspect;

pub mod config;
pub mod context;
pub mod engine;
mod error;
pub mod kind;
pub mod output;
pub mod palette;
pub mod render;
pub mod value;

pub use config::{options, set_option, set_options, OptionValue, Options};
pub use engine::{ChannelWriter, Dispatch, Handler, Sentinel, Walker};
pub use error::InspectError;
pub use kind::{classify, Kind};
pub use output::{
    detect_output_mode, dump, dump_at, dump_to_string, dump_to_writer, reset_output_detector,
    set_output_detector, CallSite, OutputMode,
};
pub use palette::{color_for, color_for_name, Category, Channel, Token};
pub use render::{ChannelRenderer, HtmlRenderer, TermRenderer};
pub use value::{
    ConversionError, FieldDescriptor, FieldError, Handle, Identity, Inspect, Key, Map, Node,
    Object, Opaque, Record, Sequence, Value, Visibility,
};

#[cfg(feature = "macros")]
pub use standout_inspect_macros::Inspect;

/// Writes values to stdout with the caller's location.
///
/// Accepts one or more expressions; each is borrowed, not moved. Output errors are
/// logged and otherwise ignored.
#[macro_export]
macro_rules! inspect {
    ($($value:expr),+ $(,)?) => {
        $crate::output::__dump_here(
            &$crate::CallSite::new(file!(), line!()).with_scope(module_path!()),
            &[$(&$value as &dyn $crate::Inspect),+],
        )
    };
}
