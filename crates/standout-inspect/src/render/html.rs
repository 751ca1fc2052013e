//! Interactive renderer: collapsible HTML.
//!
//! Output is a `<pre>` block per value. Every non-empty sequence and record gets a
//! container with a process-unique id (`sti-N`) and a toggle bound to it. Containers
//! start expanded.
//!
//! The style sheet and the `stiToggle` script are emitted once per process, before
//! the first rendered value. The flag guarding them is an [`AtomicBool`]; a renderer
//! can be given its own flag with [`HtmlRenderer::with_asset_flag`].
//!
//! When a [`CallSite`] is supplied, a header with the source location and the
//! enclosing scope is rendered above each value.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};

use minijinja::{context, AutoEscape, Environment};
use once_cell::sync::Lazy;

use crate::config::Options;
use crate::context::{next_node_id, RenderContext};
use crate::engine::{
    escape_control, format_float, format_handle, more_elements_text, ChannelWriter, Dispatch,
    Handler, Preview, Sentinel, Walker, TRUNCATED_MARKER,
};
use crate::error::InspectError;
use crate::kind::Kind;
use crate::output::CallSite;
use crate::palette::{color_for, Category, Channel};
use crate::render::ChannelRenderer;
use crate::value::{FieldDescriptor, Inspect, Key, Node};

const INDENT: &str = "  ";

/// Style sheet and toggle script shared by every rendered value.
pub const ASSETS: &str = r#"<style>
.sti-dump{margin:0.5em 0;font:12px/1.4 Menlo,Monaco,Consolas,monospace;}
.sti-dump pre.sti{margin:0;padding:6px 8px;background:#18171b;color:#ff8400;white-space:pre;overflow:auto;}
.sti-header{padding:2px 8px;background:#2d2b33;color:#a0a0a0;}
.sti-toggle{color:#a0a0a0;text-decoration:none;cursor:pointer;}
.sti-collapsed{display:none;}
.sti-meta,.sti-note{color:#a0a0a0;}
</style>
<script>
function stiToggle(a){var el=document.getElementById(a.getAttribute('data-target'));if(!el){return false;}var collapsed=el.classList.toggle('sti-collapsed');a.innerHTML=collapsed?'&#9654;':'&#9660;';a.setAttribute('aria-expanded',collapsed?'false':'true');return false;}
</script>
"#;

static ASSETS_EMITTED: AtomicBool = AtomicBool::new(false);

const HEADER_TEMPLATE: &str = r#"<div class="sti-header"><span class="sti-location">{{ file }}:{{ line }}</span>{% if scope %} <span class="sti-scope">{{ scope }}</span>{% endif %}</div>"#;

static HEADER_ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    if let Err(err) = env.add_template("header.html", HEADER_TEMPLATE) {
        log::warn!("invalid header template: {}", err);
    }
    env
});

fn render_header(site: &CallSite) -> Result<String, InspectError> {
    let template = HEADER_ENV.get_template("header.html")?;
    let html = template.render(context! {
        file => &*site.file,
        line => site.line,
        scope => site.scope.as_deref(),
    })?;
    Ok(html)
}

/// Escapes text for HTML content and attribute values.
pub(crate) fn html_escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Renders values as collapsible HTML.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    options: Options,
    dispatch: Dispatch<HtmlWriter>,
    assets: &'static AtomicBool,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlRenderer {
    /// Creates a renderer sharing the process-wide asset flag.
    pub fn new() -> Self {
        Self {
            options: Options::default(),
            dispatch: Dispatch::standard(),
            assets: &ASSETS_EMITTED,
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Uses `flag` instead of the process-wide flag to track emitted assets.
    pub fn with_asset_flag(mut self, flag: &'static AtomicBool) -> Self {
        self.assets = flag;
        self
    }

    /// True once the assets have been emitted under this renderer's flag.
    pub fn assets_emitted(&self) -> bool {
        self.assets.load(Ordering::Acquire)
    }

    fn claim_assets(&self) -> bool {
        self.assets
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl ChannelRenderer for HtmlRenderer {
    type Writer = HtmlWriter;

    fn options(&self) -> &Options {
        &self.options
    }

    fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    fn register(&mut self, kind: Kind, handler: Handler<HtmlWriter>) -> Option<Handler<HtmlWriter>> {
        self.dispatch.register(kind, handler)
    }

    fn render_to_string(&self, values: &[&dyn Inspect], site: Option<&CallSite>) -> String {
        let mut out = String::new();
        if values.is_empty() {
            return out;
        }
        if self.claim_assets() {
            out.push_str(ASSETS);
        }

        for value in values {
            out.push_str("<div class=\"sti-dump\">\n");
            if let Some(site) = site {
                match render_header(site) {
                    Ok(header) => {
                        out.push_str(&header);
                        out.push('\n');
                    }
                    Err(err) => log::warn!("skipping caller header: {}", err),
                }
            }
            out.push_str("<pre class=\"sti\">");
            let mut walker = Walker::new(&self.options, &self.dispatch, HtmlWriter::new());
            walker.render(*value);
            out.push_str(&walker.into_writer().finish());
            out.push_str("</pre>\n</div>\n");
        }
        out
    }
}

/// Output buffer of the interactive renderer.
#[derive(Debug, Default)]
pub struct HtmlWriter {
    out: String,
}

impl HtmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends escaped, unstyled text.
    pub fn text(&mut self, text: &str) {
        html_escape_into(&mut self.out, text);
    }

    /// Appends raw markup.
    pub fn markup(&mut self, markup: &str) {
        self.out.push_str(markup);
    }

    /// Appends text in a category's color.
    pub fn paint(&mut self, category: Category, text: &str) {
        self.paint_with(category.name(), category, text);
    }

    fn paint_with(&mut self, class: &str, category: Category, text: &str) {
        let css = color_for(Channel::Interactive, category)
            .css()
            .unwrap_or_default();
        let _ = write!(self.out, "<span class=\"sti-{}\" style=\"color:{}\">", class, css);
        html_escape_into(&mut self.out, text);
        self.out.push_str("</span>");
    }

    fn note(&mut self, text: &str) {
        self.out.push_str(" <span class=\"sti-note\">");
        html_escape_into(&mut self.out, text);
        self.out.push_str("</span>");
    }

    pub fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
    }

    /// Writes a toggle and opens the collapsible container `id`.
    fn open_container(&mut self, id: u64, bracket: &str) {
        let _ = write!(
            self.out,
            " <a class=\"sti-toggle\" href=\"#\" data-target=\"sti-{id}\" aria-expanded=\"true\" onclick=\"return stiToggle(this)\">&#9660;</a>{bracket}<span class=\"sti-children\" id=\"sti-{id}\">\n",
        );
    }

    fn close_container(&mut self, depth: usize, bracket: &str) {
        self.indent(depth);
        self.out.push_str("</span>");
        self.out.push_str(bracket);
    }

    pub fn finish(self) -> String {
        self.out
    }
}

impl ChannelWriter for HtmlWriter {
    fn begin_entry(&mut self, key: Option<&Key<'_>>, ctx: &RenderContext) {
        self.indent(ctx.depth());
        if let Some(key) = key {
            self.paint(Category::Key, &key.to_string());
            self.out.push_str(" =&gt; ");
        }
    }

    fn end_entry(&mut self, _ctx: &RenderContext) {
        self.out.push('\n');
    }

    fn field_label(&mut self, field: &FieldDescriptor, _ctx: &RenderContext) {
        let css = color_for(Channel::Interactive, Category::Field)
            .css()
            .unwrap_or_default();
        let _ = write!(
            self.out,
            "<span class=\"sti-field\" style=\"color:{}\" title=\"{}\">{}",
            css,
            field.visibility(),
            field.visibility().marker()
        );
        html_escape_into(&mut self.out, field.name());
        self.out.push_str("</span>: ");
    }

    fn sentinel(&mut self, sentinel: &Sentinel<'_>, _ctx: &RenderContext) {
        self.paint_with("sentinel", Category::Null, &sentinel.to_string());
    }

    fn more_elements(&mut self, remaining: usize, ctx: &RenderContext) {
        self.indent(ctx.depth());
        self.paint_with("more", Category::Null, &more_elements_text(remaining));
        self.out.push('\n');
    }

    fn scalar(walker: &mut Walker<'_, Self>, node: &Node<'_>, _key: Option<&Key<'_>>) {
        match node {
            Node::Str(s) => {
                let clipped = walker.clip(s);
                let w = walker.writer_mut();
                let _ = write!(w.out, "<span class=\"sti-meta\">string({})</span> ", clipped.length);
                w.paint(Category::String, &format!("\"{}\"", escape_control(clipped.text)));
                if clipped.truncated {
                    w.note(TRUNCATED_MARKER);
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
        let hidden = walker.hidden_entries(len);
        let depth = walker.context().depth();

        {
            let w = walker.writer_mut();
            w.paint(Category::Sequence, &format!("{}({})", seq.type_name(), len));
            if len == 0 {
                w.markup(" []");
                return;
            }
            if hidden > 0 {
                w.note(&format!("(showing {} of {})", len - hidden, len));
            }
            w.open_container(next_node_id(), "[");
        }
        walker.render_entries(seq);
        walker.writer_mut().close_container(depth, "]");
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
                let _ = write!(w.out, " <span class=\"sti-meta\">#{}</span>", handle);
            }
        }
        match preview {
            Some(Preview::Text { text, truncated }) => {
                let w = walker.writer_mut();
                w.markup(" ");
                w.paint(Category::String, &format!("\"{}\"", text));
                if truncated {
                    w.note(TRUNCATED_MARKER);
                }
            }
            Some(Preview::Failed(message)) => {
                let (w, ctx) = walker.parts();
                w.markup(" ");
                w.sentinel(&Sentinel::ConversionError(message.into()), ctx);
            }
            None => {}
        }

        match fields {
            Err(err) => {
                let (w, ctx) = walker.parts();
                w.markup(" { ");
                w.sentinel(&Sentinel::for_field_error(&err), ctx);
                w.markup(" }");
            }
            Ok(fields) if fields.is_empty() => walker.writer_mut().markup(" {}"),
            Ok(fields) => {
                {
                    let w = walker.writer_mut();
                    let count = fields.len();
                    let noun = if count == 1 { "field" } else { "fields" };
                    let _ = write!(w.out, " <span class=\"sti-meta\">({} {})</span>", count, noun);
                    w.open_container(next_node_id(), "{");
                }
                walker.render_fields(record, &fields);
                walker.writer_mut().close_container(depth, "}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Object, Visibility};

    fn render(renderer: &HtmlRenderer, value: &dyn Inspect) -> String {
        renderer.render_to_string(&[value], None)
    }

    #[test]
    fn test_escape() {
        let mut out = String::new();
        html_escape_into(&mut out, "<b>\"a\" & 'b'</b>");
        assert_eq!(out, "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;");
    }

    #[test]
    fn test_assets_emitted_once_per_flag() {
        static FLAG: AtomicBool = AtomicBool::new(false);
        let renderer = HtmlRenderer::new().with_asset_flag(&FLAG);
        assert!(!renderer.assets_emitted());

        let first = render(&renderer, &1);
        let second = render(&renderer, &2);
        assert!(first.starts_with("<style>"));
        assert_eq!(first.matches("function stiToggle").count(), 1);
        assert!(!second.contains("<style>"));
        assert!(renderer.assets_emitted());
    }

    #[test]
    fn test_containers_get_unique_ids_and_start_expanded() {
        static FLAG: AtomicBool = AtomicBool::new(true);
        let renderer = HtmlRenderer::new().with_asset_flag(&FLAG);
        let out = render(&renderer, &vec![vec![1], vec![2]]);

        let ids: Vec<&str> = out
            .match_indices("id=\"sti-")
            .map(|(i, _)| {
                let rest = &out[i + 4..];
                &rest[..rest.find('"').unwrap_or(rest.len())]
            })
            .collect();
        assert_eq!(ids.len(), 3);
        let mut unique = ids.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 3);
        assert!(!out.contains("class=\"sti-children sti-collapsed\""));
        for id in ids {
            assert!(out.contains(&format!("data-target=\"{}\"", id)));
        }
    }

    #[test]
    fn test_truncation_note_on_opening_marker() {
        static FLAG: AtomicBool = AtomicBool::new(true);
        let renderer = HtmlRenderer::new()
            .with_asset_flag(&FLAG)
            .with_options(Options::default().max_sequence_elements(2));
        let items: Vec<u8> = (0..5).collect();
        let out = render(&renderer, &items);

        let note = out.find("(showing 2 of 5)").unwrap();
        let open = out.find("sti-children").unwrap();
        assert!(note < open);
        assert!(out.contains("… and 3 more elements"));
    }

    #[test]
    fn test_values_are_escaped() {
        static FLAG: AtomicBool = AtomicBool::new(true);
        let renderer = HtmlRenderer::new().with_asset_flag(&FLAG);
        let out = render(&renderer, &"<script>");
        assert!(out.contains("&quot;&lt;script&gt;&quot;"));
        assert!(!out.contains("\"<script>\""));
    }

    #[test]
    fn test_newlines_in_values_are_escaped() {
        static FLAG: AtomicBool = AtomicBool::new(true);
        let renderer = HtmlRenderer::new().with_asset_flag(&FLAG);
        let out = render(&renderer, &"a\nb");
        assert!(out.contains("&quot;a\\nb&quot;"));
        assert!(!out.contains("a\nb"));
    }

    #[test]
    fn test_empty_call_keeps_assets_for_later() {
        static FLAG: AtomicBool = AtomicBool::new(false);
        let renderer = HtmlRenderer::new().with_asset_flag(&FLAG);

        assert_eq!(renderer.render_to_string(&[], None), "");
        assert!(!renderer.assets_emitted());

        let out = render(&renderer, &1);
        assert!(out.starts_with("<style>"));
    }

    #[test]
    fn test_record_header_and_fields() {
        static FLAG: AtomicBool = AtomicBool::new(true);
        let renderer = HtmlRenderer::new().with_asset_flag(&FLAG);
        let user = Object::new("User")
            .with("name", Visibility::Public, "ada")
            .with("secret", Visibility::Private, 1)
            .with_preview(|_| Ok("ada".into()));
        let out = render(&renderer, &user);

        assert!(out.contains(">User</span>"));
        assert!(out.contains("#1"));
        assert!(out.contains("(2 fields)"));
        assert!(out.contains("title=\"private\">-secret</span>: "));
        assert!(out.contains("&quot;ada&quot;"));
    }

    #[test]
    fn test_header_is_escaped() {
        static FLAG: AtomicBool = AtomicBool::new(true);
        let renderer = HtmlRenderer::new().with_asset_flag(&FLAG);
        let site = CallSite::new("src/main.rs", 12).with_scope("<main>");
        let out = renderer.render_to_string(&[&1], Some(&site));

        // minijinja also escapes `/` in HTML mode
        assert!(out.contains("main.rs:12"));
        assert!(out.contains("&lt;main&gt;"));
        assert!(out.find("sti-header").unwrap() < out.find("<pre").unwrap());
    }

    #[test]
    fn test_header_without_scope() {
        let site = CallSite::new("lib.rs", 3);
        let header = render_header(&site).unwrap();
        assert!(header.contains("lib.rs:3"));
        assert!(!header.contains("sti-scope"));
    }

    #[test]
    fn test_cycle_sentinel_in_markup() {
        static FLAG: AtomicBool = AtomicBool::new(true);
        let renderer = HtmlRenderer::new().with_asset_flag(&FLAG);
        let node = Object::new("Node");
        node.set("next", node.clone());
        let out = render(&renderer, &node);
        assert_eq!(out.matches("*RECURSION* Node #1").count(), 1);
        assert!(out.contains("class=\"sti-sentinel\""));
    }
}
