//! Entry facade: channel selection, caller location, and the `dump` functions.
//!
//! The facade picks a renderer for the [`OutputMode`], applies the process-wide
//! default [`Options`](crate::Options), and writes the result to stdout.
//!
//! # Auto Detection
//!
//! [`OutputMode::Auto`] is resolved by [`detect_output_mode`]:
//!
//! 1. The `STANDOUT_INSPECT` environment variable (`html`, `term` or `text`)
//! 2. Otherwise [`OutputMode::Term`] when stdout supports colors, else
//!    [`OutputMode::Text`]
//!
//! Use [`set_output_detector`] to override detection, e.g. in tests:
//!
//! ```rust
//! use standout_inspect::{detect_output_mode, set_output_detector, OutputMode};
//!
//! set_output_detector(|| OutputMode::Text);
//! assert_eq!(detect_output_mode(), OutputMode::Text);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::InspectError;
use crate::render::{ChannelRenderer, HtmlRenderer, TermRenderer};
use crate::value::Inspect;

/// Environment variable that selects the channel in [`OutputMode::Auto`].
pub const MODE_ENV_VAR: &str = "STANDOUT_INSPECT";

/// Which channel renders the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Resolve from the environment.
    #[default]
    Auto,
    /// Collapsible HTML (interactive channel).
    Html,
    /// Indented text with ANSI colors (flat channel).
    Term,
    /// Indented text without escapes (flat channel).
    Text,
}

impl OutputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputMode::Auto => "auto",
            OutputMode::Html => "html",
            OutputMode::Term => "term",
            OutputMode::Text => "text",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(OutputMode::Auto),
            "html" => Ok(OutputMode::Html),
            "term" => Ok(OutputMode::Term),
            "text" | "plain" => Ok(OutputMode::Text),
            other => Err(format!("unknown output mode: {}", other)),
        }
    }
}

type OutputDetector = fn() -> OutputMode;

static OUTPUT_DETECTOR: Lazy<Mutex<OutputDetector>> =
    Lazy::new(|| Mutex::new(default_output_detector));

/// Overrides the detector used to resolve [`OutputMode::Auto`].
pub fn set_output_detector(detector: OutputDetector) {
    let mut guard = OUTPUT_DETECTOR
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    *guard = detector;
}

/// Restores the default detector.
pub fn reset_output_detector() {
    set_output_detector(default_output_detector);
}

/// Detects the output mode. Never returns [`OutputMode::Auto`].
pub fn detect_output_mode() -> OutputMode {
    let detector = *OUTPUT_DETECTOR
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    resolve(detector())
}

/// Resolves `Auto` through the detector chain; other modes pass through.
pub fn resolve(mode: OutputMode) -> OutputMode {
    match mode {
        OutputMode::Auto => resolve_auto(),
        other => other,
    }
}

fn resolve_auto() -> OutputMode {
    if let Ok(value) = std::env::var(MODE_ENV_VAR) {
        match value.parse::<OutputMode>() {
            Ok(OutputMode::Auto) => {}
            Ok(mode) => {
                log::debug!("output mode {} from {}", mode, MODE_ENV_VAR);
                return mode;
            }
            Err(err) => log::debug!("ignoring {}: {}", MODE_ENV_VAR, err),
        }
    }
    if console::colors_enabled() {
        OutputMode::Term
    } else {
        OutputMode::Text
    }
}

fn default_output_detector() -> OutputMode {
    OutputMode::Auto
}

/// Where an inspection was requested from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSite {
    /// Source file path.
    pub file: Cow<'static, str>,
    pub line: u32,
    /// Enclosing scope, such as a module path or function name.
    pub scope: Option<Cow<'static, str>>,
}

impl CallSite {
    pub fn new(file: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<Cow<'static, str>>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)?;
        if let Some(scope) = &self.scope {
            write!(f, " ({})", scope)?;
        }
        Ok(())
    }
}

/// Renders values for `mode` with the process-wide default options.
pub fn dump_to_string(mode: OutputMode, values: &[&dyn Inspect], site: Option<&CallSite>) -> String {
    let options = config::options();
    match resolve(mode) {
        OutputMode::Html => HtmlRenderer::new()
            .with_options(options)
            .render_to_string(values, site),
        OutputMode::Term => TermRenderer::new()
            .styled(true)
            .with_options(options)
            .render_to_string(values, site),
        OutputMode::Text | OutputMode::Auto => TermRenderer::plain()
            .with_options(options)
            .render_to_string(values, site),
    }
}

/// Renders values for `mode` and writes them to `sink`.
pub fn dump_to_writer(
    mode: OutputMode,
    values: &[&dyn Inspect],
    site: Option<&CallSite>,
    sink: &mut dyn Write,
) -> Result<(), InspectError> {
    let output = dump_to_string(mode, values, site);
    sink.write_all(output.as_bytes())?;
    sink.flush()?;
    Ok(())
}

/// Writes values to stdout with the detected output mode.
pub fn dump(values: &[&dyn Inspect]) -> Result<(), InspectError> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    dump_to_writer(detect_output_mode(), values, None, &mut lock)
}

/// Like [`dump`], with a caller location shown by the HTML channel.
pub fn dump_at(site: &CallSite, values: &[&dyn Inspect]) -> Result<(), InspectError> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    dump_to_writer(detect_output_mode(), values, Some(site), &mut lock)
}

#[doc(hidden)]
pub fn __dump_here(site: &CallSite, values: &[&dyn Inspect]) {
    if let Err(err) = dump_at(site, values) {
        log::warn!("inspect output at {} failed: {}", site, err);
    }
}
