//! Flat renderer: indented text for terminals and logs.
//!
//! Every line is indented two spaces per depth level. When styled, each colored
//! span is wrapped in its own escape sequence and reset; the output never depends
//! on a trailing global reset. Unstyled output contains no escapes at all.
//!
//! ```text
//! array(2) [
//!   0 => string(5) "hello"
//!   1 => User #1 {
//!     +name: string(3) "ada"
//!     -token: *uninitialized*
//!   }
//! ]
//! ```

use std::fmt::Write as _;

use crate::config::Options;
use crate::context::RenderContext;
use crate::engine::{
    escape_control, format_float, format_handle, more_elements_text, ChannelWriter, Dispatch,
    Handler, Preview, Sentinel, Walker, TRUNCATED_MARKER,
};
use crate::kind::Kind;
use crate::output::CallSite;
use crate::palette::{color_for, Category, Channel};
use crate::render::ChannelRenderer;
use crate::value::{FieldDescriptor, Inspect, Key, Node};

const INDENT: &str = "  ";

/// Renders values as indented, optionally colored, text.
#[derive(Debug, Clone)]
pub struct TermRenderer {
    options: Options,
    dispatch: Dispatch<TermWriter>,
    styled: bool,
}

impl Default for TermRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TermRenderer {
    /// Creates a renderer that styles output when the terminal supports colors.
    pub fn new() -> Self {
        Self {
            options: Options::default(),
            dispatch: Dispatch::standard(),
            styled: console::colors_enabled(),
        }
    }

    /// Creates a renderer that never emits escape sequences.
    pub fn plain() -> Self {
        Self::new().styled(false)
    }

    pub fn styled(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn is_styled(&self) -> bool {
        self.styled
    }
}

impl ChannelRenderer for TermRenderer {
    type Writer = TermWriter;

    fn options(&self) -> &Options {
        &self.options
    }

    fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    fn register(&mut self, kind: Kind, handler: Handler<TermWriter>) -> Option<Handler<TermWriter>> {
        self.dispatch.register(kind, handler)
    }

    /// Renders values one after the other, separated by a blank line.
    ///
    /// Caller locations are not shown on this channel.
    fn render_to_string(&self, values: &[&dyn Inspect], _site: Option<&CallSite>) -> String {
        let mut out = String::new();
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let mut walker = Walker::new(&self.options, &self.dispatch, TermWriter::new(self.styled));
            walker.render(*value);
            out.push_str(&walker.into_writer().finish());
        }
        out
    }
}

/// Output buffer of the flat renderer.
#[derive(Debug, Default)]
pub struct TermWriter {
    out: String,
    styled: bool,
}

impl TermWriter {
    pub fn new(styled: bool) -> Self {
        Self {
            out: String::new(),
            styled,
        }
    }

    /// Appends unstyled text.
    pub fn push_str(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Appends text in a category's color.
    pub fn paint(&mut self, category: Category, text: &str) {
        if self.styled {
            let style = color_for(Channel::Flat, category).style();
            let _ = write!(self.out, "{}", style.apply_to(text));
        } else {
            self.out.push_str(text);
        }
    }

    pub fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
    }

    pub fn finish(self) -> String {
        self.out
    }
}

impl ChannelWriter for TermWriter {
    fn begin_entry(&mut self, key: Option<&Key<'_>>, ctx: &RenderContext) {
        self.indent(ctx.depth());
        if let Some(key) = key {
            self.paint(Category::Key, &key.to_string());
            self.push_str(" => ");
        }
    }

    fn end_entry(&mut self, _ctx: &RenderContext) {
        self.out.push('\n');
    }

    fn field_label(&mut self, field: &FieldDescriptor, _ctx: &RenderContext) {
        let label = format!("{}{}", field.visibility().marker(), field.name());
        self.paint(Category::Field, &label);
        self.push_str(": ");
    }

    fn sentinel(&mut self, sentinel: &Sentinel<'_>, _ctx: &RenderContext) {
        self.paint(Category::Null, &sentinel.to_string());
    }

    fn more_elements(&mut self, remaining: usize, ctx: &RenderContext) {
        self.indent(ctx.depth());
        self.paint(Category::Null, &more_elements_text(remaining));
        self.out.push('\n');
    }

    fn scalar(walker: &mut Walker<'_, Self>, node: &Node<'_>, _key: Option<&Key<'_>>) {
        match node {
            Node::Str(s) => {
                let clipped = walker.clip(s);
                let w = walker.writer_mut();
                w.push_str(&format!("string({}) ", clipped.length));
                w.paint(Category::String, &format!("\"{}\"", escape_control(clipped.text)));
                if clipped.truncated {
                    w.push_str(" ");
                    w.paint(Category::Null, TRUNCATED_MARKER);
                }
            }
            Node::Int(i) => walker
                .writer_mut()
                .paint(Category::Integer, &format!("int({})", i)),
            Node::Float(x) => walker
                .writer_mut()
                .paint(Category::Float, &format!("float({})", format_float(*x))),
            Node::Bool(b) => walker
                .writer_mut()
                .paint(Category::Boolean, &format!("bool({})", b)),
            Node::Null => walker.writer_mut().paint(Category::Null, "null"),
            Node::Handle(handle) => walker
                .writer_mut()
                .paint(Category::Handle, &format_handle(handle)),
            other => {
                let sentinel = Sentinel::Unsupported(other.type_name());
                let (w, ctx) = walker.parts();
                w.sentinel(&sentinel, ctx);
            }
        }
    }

    fn sequence(walker: &mut Walker<'_, Self>, node: &Node<'_>, _key: Option<&Key<'_>>) {
        let Node::Sequence { seq, .. } = node else {
            return;
        };
        let seq = *seq;
        let len = seq.len();
        let depth = walker.context().depth();

        let header = format!("{}({})", seq.type_name(), len);
        walker.writer_mut().paint(Category::Sequence, &header);
        if len == 0 {
            walker.writer_mut().push_str(" []");
            return;
        }

        walker.writer_mut().push_str(" [\n");
        walker.render_entries(seq);
        let w = walker.writer_mut();
        w.indent(depth);
        w.push_str("]");
    }

    fn record(walker: &mut Walker<'_, Self>, node: &Node<'_>, _key: Option<&Key<'_>>) {
        let Node::Record { record, identity } = node else {
            return;
        };
        let record = *record;
        let handle = identity.map(|id| walker.handle_for(id));
        let preview = walker.preview(record);
        let fields = walker.visible_fields(record);
        let depth = walker.context().depth();

        {
            let w = walker.writer_mut();
            w.paint(Category::Record, &record.class_name());
            if let Some(handle) = handle {
                w.push_str(&format!(" #{}", handle));
            }
        }
        match preview {
            Some(Preview::Text { text, truncated }) => {
                let w = walker.writer_mut();
                w.push_str(" ");
                w.paint(Category::String, &format!("\"{}\"", text));
                if truncated {
                    w.push_str(" ");
                    w.paint(Category::Null, TRUNCATED_MARKER);
                }
            }
            Some(Preview::Failed(message)) => {
                let (w, ctx) = walker.parts();
                w.push_str(" ");
                w.sentinel(&Sentinel::ConversionError(message.into()), ctx);
            }
            None => {}
        }

        match fields {
            Err(err) => {
                let (w, ctx) = walker.parts();
                w.push_str(" { ");
                w.sentinel(&Sentinel::for_field_error(&err), ctx);
                w.push_str(" }");
            }
            Ok(fields) if fields.is_empty() => walker.writer_mut().push_str(" {}"),
            Ok(fields) => {
                walker.writer_mut().push_str(" {\n");
                walker.render_fields(record, &fields);
                let w = walker.writer_mut();
                w.indent(depth);
                w.push_str("}");
            }
        }
    }
}
