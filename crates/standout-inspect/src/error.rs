//! Error types.
//!
//! Rendering itself cannot fail: every problem found while walking a value becomes
//! an inline sentinel. [`InspectError`] covers what remains: writing to the sink,
//! configuration, and the header template.

use thiserror::Error;

/// Error type for the public, fallible operations of this crate.
#[derive(Debug, Error)]
pub enum InspectError {
    /// Writing rendered output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A recognized option was given a value of the wrong type.
    #[error("invalid value for option `{key}`: expected {expected}")]
    InvalidOption { key: String, expected: &'static str },

    /// An options file could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// The caller-location header template failed.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}
