//! Channel renderers.
//!
//! Both renderers share the [`Walker`](crate::engine::Walker) and differ only in
//! what they write:
//!
//! - [`TermRenderer`]: indented plain text, optionally with ANSI colors
//! - [`HtmlRenderer`]: collapsible HTML markup with inline colors
//!
//! A renderer owns its [`Options`] and its dispatch table. Options and handlers may
//! be changed between calls, never during one.

mod html;
mod term;

use std::io::Write;

pub use html::{HtmlRenderer, HtmlWriter, ASSETS};
pub use term::{TermRenderer, TermWriter};

use crate::config::{OptionValue, Options};
use crate::engine::{ChannelWriter, Handler};
use crate::error::InspectError;
use crate::kind::Kind;
use crate::output::CallSite;
use crate::value::Inspect;

/// Common surface of the output channels.
pub trait ChannelRenderer {
    /// The writer the renderer's handlers write through.
    type Writer: ChannelWriter;

    fn options(&self) -> &Options;

    fn options_mut(&mut self) -> &mut Options;

    /// Sets one option by key.
    fn set_option(&mut self, key: &str, value: impl Into<OptionValue>) -> Result<(), InspectError>
    where
        Self: Sized,
    {
        self.options_mut().set_option(key, value)
    }

    /// Registers a handler for a kind, returning the one it replaces.
    fn register(&mut self, kind: Kind, handler: Handler<Self::Writer>)
        -> Option<Handler<Self::Writer>>;

    /// Renders values in order, each with its own traversal state.
    fn render_to_string(&self, values: &[&dyn Inspect], site: Option<&CallSite>) -> String;

    /// Renders values and writes the result to `sink`.
    fn render(
        &self,
        values: &[&dyn Inspect],
        site: Option<&CallSite>,
        sink: &mut dyn Write,
    ) -> Result<(), InspectError> {
        let output = self.render_to_string(values, site);
        sink.write_all(output.as_bytes())?;
        sink.flush()?;
        Ok(())
    }
}
