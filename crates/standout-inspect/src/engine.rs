//! The traversal engine.
//!
//! [`Walker`] walks one top-level value and drives a channel writer. For every node
//! it applies the same steps, in this order:
//!
//! 1. **Cycle check**: a composite whose identity is already on the current path
//!    renders as the recursion sentinel.
//! 2. **Depth check**: at `max_depth` or deeper, any node renders as the max-depth
//!    sentinel.
//! 3. **Dispatch**: the node is classified and handed to the handler registered for
//!    its [`Kind`] in the renderer's [`Dispatch`] table. Kinds without a handler
//!    render as the unsupported sentinel.
//! 4. **Cycle bookkeeping**: composites with identity are added to the visited set
//!    before their handler runs and removed after it returns.
//!
//! Truncation is applied here too, the same way for every channel: strings are cut
//! to `max_string_length` characters and sequences to `max_sequence_elements`
//! entries. The reported length or count is always the original one.
//!
//! Field access failures never escape a render pass; they become sentinels.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::mem;
use std::ops::ControlFlow;

use crate::config::Options;
use crate::context::{HandleTable, RenderContext, VisitedSet};
use crate::kind::Kind;
use crate::value::{
    FieldDescriptor, FieldError, Handle, Identity, Inspect, Key, Node, Record, Sequence,
    Visibility,
};

/// Appended to strings and previews that were cut short.
pub const TRUNCATED_MARKER: &str = "[truncated]";

/// Fixed placeholder renderings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sentinel<'a> {
    /// The depth limit was reached.
    MaxDepth,
    /// A composite was reached again while still being rendered.
    Recursion { type_name: Cow<'a, str>, handle: usize },
    /// A declared field has no value yet.
    Uninitialized,
    /// Reading a field failed.
    FieldError(Cow<'a, str>),
    /// A record's textual preview failed.
    ConversionError(Cow<'a, str>),
    /// No handler is registered for the value's kind.
    Unsupported(Cow<'a, str>),
}

impl Sentinel<'_> {
    /// The sentinel for a failed field read.
    pub fn for_field_error(err: &FieldError) -> Sentinel<'static> {
        match err {
            FieldError::Uninitialized => Sentinel::Uninitialized,
            other => Sentinel::FieldError(Cow::Owned(other.to_string())),
        }
    }
}

impl fmt::Display for Sentinel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentinel::MaxDepth => f.write_str("*MAX DEPTH*"),
            Sentinel::Recursion { type_name, handle } => {
                write!(f, "*RECURSION* {} #{}", type_name, handle)
            }
            Sentinel::Uninitialized => f.write_str("*uninitialized*"),
            Sentinel::FieldError(message) => write!(f, "*error: {}*", escape_control(message)),
            Sentinel::ConversionError(message) => {
                write!(f, "*conversion error: {}*", escape_control(message))
            }
            Sentinel::Unsupported(type_name) => write!(f, "*unsupported: {}*", type_name),
        }
    }
}

/// The output half of a channel renderer.
///
/// Instance methods write the pieces the engine itself emits (entry framing, labels,
/// sentinels, remainder markers). The associated functions are the per-kind
/// handlers registered in the [`Dispatch`] table by [`Dispatch::standard`].
pub trait ChannelWriter: Sized {
    /// Starts a node's line: indentation, then the key label if there is one.
    fn begin_entry(&mut self, key: Option<&Key<'_>>, ctx: &RenderContext);

    /// Ends a node's line.
    fn end_entry(&mut self, ctx: &RenderContext);

    /// Writes a record field label; the value follows inline.
    fn field_label(&mut self, field: &FieldDescriptor, ctx: &RenderContext);

    fn sentinel(&mut self, sentinel: &Sentinel<'_>, ctx: &RenderContext);

    /// Writes the "… and K more elements" line at the children's depth.
    fn more_elements(&mut self, remaining: usize, ctx: &RenderContext);

    /// Handler for strings, numbers, booleans, null and handles.
    fn scalar(walker: &mut Walker<'_, Self>, node: &Node<'_>, key: Option<&Key<'_>>);

    /// Handler for sequences.
    fn sequence(walker: &mut Walker<'_, Self>, node: &Node<'_>, key: Option<&Key<'_>>);

    /// Handler for records.
    fn record(walker: &mut Walker<'_, Self>, node: &Node<'_>, key: Option<&Key<'_>>);
}

/// A per-kind render function.
pub type Handler<W> = fn(&mut Walker<'_, W>, &Node<'_>, Option<&Key<'_>>);

/// Mapping from [`Kind`] to the handler that renders it.
///
/// Adding support for a kind means registering a handler; the walker never
/// changes.
pub struct Dispatch<W> {
    handlers: HashMap<Kind, Handler<W>>,
}

impl<W> Clone for Dispatch<W> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<W> fmt::Debug for Dispatch<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("Dispatch").field("kinds", &kinds).finish()
    }
}

impl<W: ChannelWriter> Dispatch<W> {
    /// A table with no handlers. Every node renders as unsupported.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// The writer's own handlers for every kind except [`Kind::Unsupported`].
    pub fn standard() -> Self {
        let mut dispatch = Self::empty();
        for kind in [
            Kind::String,
            Kind::Integer,
            Kind::Float,
            Kind::Boolean,
            Kind::Null,
            Kind::ExternalHandle,
        ] {
            dispatch.register(kind, W::scalar);
        }
        dispatch.register(Kind::Sequence, W::sequence);
        dispatch.register(Kind::Record, W::record);
        dispatch
    }

    /// Registers a handler, returning the one it replaces.
    pub fn register(&mut self, kind: Kind, handler: Handler<W>) -> Option<Handler<W>> {
        self.handlers.insert(kind, handler)
    }

    pub fn get(&self, kind: Kind) -> Option<Handler<W>> {
        self.handlers.get(&kind).copied()
    }

    pub fn contains(&self, kind: Kind) -> bool {
        self.handlers.contains_key(&kind)
    }
}

/// A string cut to the display limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clipped<'s> {
    /// The displayed prefix.
    pub text: &'s str,
    /// Length of the original string, in characters.
    pub length: usize,
    pub truncated: bool,
}

/// Cuts `s` to at most `max_chars` characters.
///
/// ```rust
/// use standout_inspect::engine::truncate;
///
/// let clipped = truncate("hello world", 5);
/// assert_eq!(clipped.text, "hello");
/// assert_eq!(clipped.length, 11);
/// assert!(clipped.truncated);
/// ```
pub fn truncate(s: &str, max_chars: usize) -> Clipped<'_> {
    let length = s.chars().count();
    if length <= max_chars {
        return Clipped {
            text: s,
            length,
            truncated: false,
        };
    }
    let end = s
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    Clipped {
        text: &s[..end],
        length,
        truncated: true,
    }
}

/// Escapes control characters so displayed text always stays on one line.
///
/// ```rust
/// use standout_inspect::engine::escape_control;
///
/// assert_eq!(escape_control("a\nb\tc"), "a\\nb\\tc");
/// assert_eq!(escape_control("\u{7}"), "\\u{7}");
/// assert_eq!(escape_control("plain"), "plain");
/// ```
pub fn escape_control(s: &str) -> Cow<'_, str> {
    if !s.chars().any(char::is_control) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Text of the remainder marker after a truncated sequence.
pub fn more_elements_text(remaining: usize) -> String {
    if remaining == 1 {
        "… and 1 more element".to_string()
    } else {
        format!("… and {} more elements", remaining)
    }
}

/// Formats a float so it never reads like an integer.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "NAN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    let text = x.to_string();
    if text.contains(['.', 'e', 'E']) {
        text
    } else {
        format!("{}.0", text)
    }
}

/// Text of an external handle, e.g. `resource(file)` or `resource(process) 4312`.
pub fn format_handle(handle: &Handle) -> String {
    match handle.id() {
        Some(id) => format!("resource({}) {}", handle.kind(), id),
        None => format!("resource({})", handle.kind()),
    }
}

/// A record's resolved preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    /// Preview text, already cut to `max_string_length`.
    Text { text: String, truncated: bool },
    /// The conversion failed with this message.
    Failed(String),
}

/// Walks one top-level value, writing through a [`ChannelWriter`].
pub struct Walker<'r, W> {
    options: &'r Options,
    dispatch: &'r Dispatch<W>,
    writer: W,
    ctx: RenderContext,
    visited: VisitedSet,
    handles: HandleTable,
}

impl<'r, W: ChannelWriter> Walker<'r, W> {
    /// Creates a walker with fresh per-call state.
    pub fn new(options: &'r Options, dispatch: &'r Dispatch<W>, writer: W) -> Self {
        Self {
            options,
            dispatch,
            writer,
            ctx: RenderContext::new(),
            visited: VisitedSet::new(),
            handles: HandleTable::default(),
        }
    }

    pub fn options(&self) -> &Options {
        self.options
    }

    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Splits the walker into its writer and the current context.
    pub fn parts(&mut self) -> (&mut W, &RenderContext) {
        (&mut self.writer, &self.ctx)
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Per-call display number of an identity (`#1`, `#2`, ...).
    pub fn handle_for(&mut self, id: Identity) -> usize {
        self.handles.handle_for(id)
    }

    /// Renders a top-level value.
    pub fn render(&mut self, value: &dyn Inspect) {
        self.render_node(value, None);
    }

    /// Renders a node as its own entry, or inline when the caller already wrote
    /// its label.
    pub fn render_node(&mut self, value: &dyn Inspect, key: Option<&Key<'_>>) {
        let inline = mem::take(&mut self.ctx.inline);
        if !inline {
            self.writer.begin_entry(key, &self.ctx);
        }
        let node = value.inspect();
        self.visit(&node, key);
        if !inline {
            self.writer.end_entry(&self.ctx);
        }
    }

    fn visit(&mut self, node: &Node<'_>, key: Option<&Key<'_>>) {
        let identity = node.identity();

        if let Some(id) = identity {
            if self.visited.contains(id) {
                let handle = self.handles.handle_for(id);
                log::trace!("recursion into #{} at depth {}", handle, self.ctx.depth);
                let sentinel = Sentinel::Recursion {
                    type_name: node.type_name(),
                    handle,
                };
                self.writer.sentinel(&sentinel, &self.ctx);
                return;
            }
        }

        if self.ctx.depth >= self.options.max_depth {
            log::trace!("max depth {} reached", self.options.max_depth);
            self.writer.sentinel(&Sentinel::MaxDepth, &self.ctx);
            return;
        }

        let kind = Kind::of(node);
        let Some(handler) = self.dispatch.get(kind) else {
            let sentinel = Sentinel::Unsupported(node.type_name());
            self.writer.sentinel(&sentinel, &self.ctx);
            return;
        };

        match identity {
            Some(id) => {
                self.visited.enter(id);
                handler(self, node, key);
                self.visited.leave(id);
            }
            None => handler(self, node, key),
        }
    }

    /// Cuts a string to `max_string_length`.
    pub fn clip<'s>(&self, s: &'s str) -> Clipped<'s> {
        truncate(s, self.options.max_string_length)
    }

    /// Number of entries of a sequence of `len` that will not be shown.
    pub fn hidden_entries(&self, len: usize) -> usize {
        len.saturating_sub(self.options.max_sequence_elements)
    }

    /// Renders the entries of a sequence one level deeper, followed by the
    /// remainder marker if some were cut. Returns the number not shown.
    pub fn render_entries(&mut self, seq: &dyn Sequence) -> usize {
        let limit = self.options.max_sequence_elements;
        let total = seq.len();
        let mut shown = 0usize;

        self.ctx.depth += 1;
        seq.for_each_entry(&mut |key, value| {
            if shown >= limit {
                return ControlFlow::Break(());
            }
            self.render_node(value, Some(&key));
            shown += 1;
            ControlFlow::Continue(())
        });
        let remaining = total.saturating_sub(shown);
        if remaining > 0 {
            self.writer.more_elements(remaining, &self.ctx);
        }
        self.ctx.depth -= 1;

        remaining
    }

    fn is_visible(&self, visibility: Visibility) -> bool {
        match visibility {
            Visibility::Public => true,
            Visibility::Protected => self.options.include_protected_fields,
            Visibility::Private => self.options.include_private_fields,
        }
    }

    /// Fields of a record that pass the visibility filters, in declaration order.
    pub fn visible_fields(&self, record: &dyn Record) -> Result<Vec<FieldDescriptor>, FieldError> {
        let mut fields = record.fields()?;
        fields.retain(|field| self.is_visible(field.visibility()));
        Ok(fields)
    }

    /// Renders record fields one level deeper, one per line.
    pub fn render_fields(&mut self, record: &dyn Record, fields: &[FieldDescriptor]) {
        self.ctx.depth += 1;
        for field in fields {
            self.writer.begin_entry(None, &self.ctx);
            self.writer.field_label(field, &self.ctx);
            self.render_field_value(record, field);
            self.writer.end_entry(&self.ctx);
        }
        self.ctx.depth -= 1;
    }

    fn render_field_value(&mut self, record: &dyn Record, field: &FieldDescriptor) {
        let result = record.read_field(field, &mut |value| {
            self.ctx.inline = true;
            self.render_node(value, None);
        });
        if let Err(err) = result {
            log::trace!("field `{}` unreadable: {}", field.name(), err);
            self.ctx.inline = false;
            self.writer
                .sentinel(&Sentinel::for_field_error(&err), &self.ctx);
        }
    }

    /// Resolves a record's preview, cut to `max_string_length`.
    pub fn preview(&self, record: &dyn Record) -> Option<Preview> {
        match record.preview()? {
            Ok(text) => {
                let clipped = self.clip(&text);
                Some(Preview::Text {
                    text: escape_control(clipped.text).into_owned(),
                    truncated: clipped.truncated,
                })
            }
            Err(err) => Some(Preview::Failed(err.0)),
        }
    }
}
