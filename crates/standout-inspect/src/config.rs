//! Inspector configuration.
//!
//! [`Options`] holds the limits and filters applied during one render pass. Options
//! can be built in code, changed through the narrow key/value [`Options::set_option`]
//! entry point, or loaded from YAML:
//!
//! ```rust
//! use standout_inspect::Options;
//!
//! let options = Options::from_yaml(r#"
//! maxDepth: 4
//! includePrivateFields: false
//! "#).unwrap();
//!
//! assert_eq!(options.max_depth, 4);
//! assert_eq!(options.max_string_length, 1000);
//! assert!(!options.include_private_fields);
//! ```
//!
//! # Recognized keys
//!
//! | Key | Type | Default |
//! |-----|------|---------|
//! | `maxDepth` | integer | 10 |
//! | `maxStringLength` | integer | 1000 |
//! | `maxSequenceElements` | integer | 100 |
//! | `includeProtectedFields` | bool | true |
//! | `includePrivateFields` | bool | true |
//!
//! Unrecognized keys are stored and otherwise ignored. Ranges are not validated:
//! `maxDepth: 0` is accepted and renders every value as the max-depth sentinel.
//!
//! # Process-wide defaults
//!
//! The entry points in the crate root ([`crate::dump`] and friends) read their
//! options from a process-wide default set with [`set_option`] / [`set_options`].
//! Changes take effect at the next top-level call.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::InspectError;

pub const MAX_DEPTH: &str = "maxDepth";
pub const MAX_STRING_LENGTH: &str = "maxStringLength";
pub const MAX_SEQUENCE_ELEMENTS: &str = "maxSequenceElements";
pub const INCLUDE_PROTECTED_FIELDS: &str = "includeProtectedFields";
pub const INCLUDE_PRIVATE_FIELDS: &str = "includePrivateFields";

/// A loosely typed option value, as accepted by [`Options::set_option`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Int(i64::from(v))
    }
}

impl From<u32> for OptionValue {
    fn from(v: u32) -> Self {
        OptionValue::Int(i64::from(v))
    }
}

impl From<usize> for OptionValue {
    fn from(v: usize) -> Self {
        OptionValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Str(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Str(v)
    }
}

/// Limits and filters for one render pass.
///
/// Options are read-only while a value is being rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Nesting depth at which nodes are replaced by the max-depth sentinel.
    pub max_depth: usize,
    /// Characters of a string shown before truncation.
    pub max_string_length: usize,
    /// Entries of a sequence shown before the remainder marker.
    pub max_sequence_elements: usize,
    pub include_protected_fields: bool,
    pub include_private_fields: bool,
    /// Unrecognized keys, kept for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, OptionValue>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_string_length: 1000,
            max_sequence_elements: 100,
            include_protected_fields: true,
            include_private_fields: true,
            extra: BTreeMap::new(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn max_string_length(mut self, length: usize) -> Self {
        self.max_string_length = length;
        self
    }

    pub fn max_sequence_elements(mut self, count: usize) -> Self {
        self.max_sequence_elements = count;
        self
    }

    pub fn include_protected_fields(mut self, include: bool) -> Self {
        self.include_protected_fields = include;
        self
    }

    pub fn include_private_fields(mut self, include: bool) -> Self {
        self.include_private_fields = include;
        self
    }

    /// Sets an option by key.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::InvalidOption`] when a recognized key gets a value of
    /// the wrong type, or a negative integer.
    pub fn set_option(&mut self, key: &str, value: impl Into<OptionValue>) -> Result<(), InspectError> {
        let value = value.into();
        match key {
            MAX_DEPTH => self.max_depth = as_count(key, &value)?,
            MAX_STRING_LENGTH => self.max_string_length = as_count(key, &value)?,
            MAX_SEQUENCE_ELEMENTS => self.max_sequence_elements = as_count(key, &value)?,
            INCLUDE_PROTECTED_FIELDS => self.include_protected_fields = as_flag(key, &value)?,
            INCLUDE_PRIVATE_FIELDS => self.include_private_fields = as_flag(key, &value)?,
            _ => {
                log::debug!("storing unrecognized option `{}`", key);
                self.extra.insert(key.to_string(), value);
            }
        }
        Ok(())
    }

    /// Reads an option by key, including unrecognized stored keys.
    pub fn get_option(&self, key: &str) -> Option<OptionValue> {
        let count = |n: usize| OptionValue::from(n);
        match key {
            MAX_DEPTH => Some(count(self.max_depth)),
            MAX_STRING_LENGTH => Some(count(self.max_string_length)),
            MAX_SEQUENCE_ELEMENTS => Some(count(self.max_sequence_elements)),
            INCLUDE_PROTECTED_FIELDS => Some(OptionValue::Bool(self.include_protected_fields)),
            INCLUDE_PRIVATE_FIELDS => Some(OptionValue::Bool(self.include_private_fields)),
            _ => self.extra.get(key).cloned(),
        }
    }

    /// Parses options from YAML. Missing keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, InspectError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads options from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, InspectError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }
}

fn as_count(key: &str, value: &OptionValue) -> Result<usize, InspectError> {
    match value {
        OptionValue::Int(n) => usize::try_from(*n).map_err(|_| invalid(key, "a non-negative integer")),
        _ => Err(invalid(key, "a non-negative integer")),
    }
}

fn as_flag(key: &str, value: &OptionValue) -> Result<bool, InspectError> {
    match value {
        OptionValue::Bool(b) => Ok(*b),
        _ => Err(invalid(key, "a boolean")),
    }
}

fn invalid(key: &str, expected: &'static str) -> InspectError {
    InspectError::InvalidOption {
        key: key.to_string(),
        expected,
    }
}

static DEFAULT_OPTIONS: Lazy<Mutex<Options>> = Lazy::new(|| Mutex::new(Options::default()));

/// Sets one process-wide default option used by the crate-level entry points.
pub fn set_option(key: &str, value: impl Into<OptionValue>) -> Result<(), InspectError> {
    let mut guard = DEFAULT_OPTIONS.lock().unwrap_or_else(PoisonError::into_inner);
    guard.set_option(key, value)
}

/// Replaces all process-wide default options.
pub fn set_options(options: Options) {
    let mut guard = DEFAULT_OPTIONS.lock().unwrap_or_else(PoisonError::into_inner);
    *guard = options;
}

/// Snapshot of the process-wide default options.
pub fn options() -> Options {
    DEFAULT_OPTIONS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
