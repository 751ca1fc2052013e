//! The inspected value model.
//!
//! The traversal engine never looks at concrete Rust types. Anything that can be
//! inspected implements [`Inspect`], which produces a borrowed [`Node`] view of the
//! value. Composite values expose their children through two capability traits:
//!
//! - [`Sequence`]: ordered entries addressed by index or by name (lists, maps, sets)
//! - [`Record`]: named fields with a [`Visibility`] tag and a fallible accessor
//!
//! # Identity
//!
//! Only values that can be shared can take part in a reference cycle. Those carry an
//! [`Identity`] (derived from the pointer of the shared allocation), which the engine
//! uses to detect re-entry. Owned values report no identity.
//!
//! # Example
//!
//! ```rust
//! use standout_inspect::{Inspect, Node};
//!
//! let value = vec![1, 2, 3];
//! match value.inspect() {
//!     Node::Sequence { seq, .. } => assert_eq!(seq.len(), 3),
//!     _ => unreachable!(),
//! }
//! ```

mod dynamic;
mod impls;

use std::borrow::Cow;
use std::fmt;
use std::ops::ControlFlow;

use thiserror::Error;

use crate::engine::escape_control;

pub use dynamic::{Map, Object, Value};
pub use impls::Opaque;

/// Types whose runtime shape can be inspected.
///
/// `Option` and iterators have an inherent `inspect` method of their own. Call
/// `Inspect::inspect(&value)` when the receiver is one of those.
pub trait Inspect {
    /// Returns a borrowed view of this value.
    fn inspect(&self) -> Node<'_>;
}

/// Borrowed view of an inspected value.
#[derive(Clone)]
pub enum Node<'a> {
    /// Absent value.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar, wide enough for every primitive integer up to `i128`.
    Int(i128),
    /// Floating point scalar.
    Float(f64),
    /// Text scalar.
    Str(Cow<'a, str>),
    /// Ordered entries.
    Sequence {
        seq: &'a dyn Sequence,
        identity: Option<Identity>,
    },
    /// Named fields.
    Record {
        record: &'a dyn Record,
        identity: Option<Identity>,
    },
    /// Resource-like handle (file, socket, process).
    Handle(Handle),
    /// A value with no meaningful structure. Carries the type name.
    Unsupported(Cow<'a, str>),
}

impl<'a> Node<'a> {
    /// Wraps a sequence without identity.
    pub fn sequence(seq: &'a dyn Sequence) -> Self {
        Node::Sequence {
            seq,
            identity: None,
        }
    }

    /// Wraps a record without identity.
    pub fn record(record: &'a dyn Record) -> Self {
        Node::Record {
            record,
            identity: None,
        }
    }

    /// Attaches an identity to a composite node that does not have one yet.
    ///
    /// Scalars are returned unchanged; they cannot take part in cycles.
    pub fn with_identity(self, id: Identity) -> Self {
        match self {
            Node::Sequence {
                seq,
                identity: None,
            } => Node::Sequence {
                seq,
                identity: Some(id),
            },
            Node::Record {
                record,
                identity: None,
            } => Node::Record {
                record,
                identity: Some(id),
            },
            other => other,
        }
    }

    /// The identity token of a shared composite, if any.
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Node::Sequence { identity, .. } | Node::Record { identity, .. } => *identity,
            _ => None,
        }
    }

    /// True for sequences and records.
    pub fn is_composite(&self) -> bool {
        matches!(self, Node::Sequence { .. } | Node::Record { .. })
    }

    /// Human-readable type tag, used by sentinels.
    pub fn type_name(&self) -> Cow<'a, str> {
        match self {
            Node::Null => Cow::Borrowed("null"),
            Node::Bool(_) => Cow::Borrowed("bool"),
            Node::Int(_) => Cow::Borrowed("int"),
            Node::Float(_) => Cow::Borrowed("float"),
            Node::Str(_) => Cow::Borrowed("string"),
            Node::Sequence { seq, .. } => {
                let seq: &'a dyn Sequence = *seq;
                seq.type_name()
            }
            Node::Record { record, .. } => {
                let record: &'a dyn Record = *record;
                record.class_name()
            }
            Node::Handle(handle) => Cow::Owned(format!("resource({})", handle.kind())),
            Node::Unsupported(name) => name.clone(),
        }
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Null => f.write_str("Null"),
            Node::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Node::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Node::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Node::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Node::Sequence { seq, identity } => f
                .debug_struct("Sequence")
                .field("type_name", &seq.type_name())
                .field("len", &seq.len())
                .field("identity", identity)
                .finish(),
            Node::Record { record, identity } => f
                .debug_struct("Record")
                .field("class_name", &record.class_name())
                .field("identity", identity)
                .finish(),
            Node::Handle(handle) => f.debug_tuple("Handle").field(handle).finish(),
            Node::Unsupported(name) => f.debug_tuple("Unsupported").field(name).finish(),
        }
    }
}

/// Ordered entries of a list-like or map-like value.
pub trait Sequence {
    /// Type tag shown in the opening marker (`array`, `map`, `set`, ...).
    fn type_name(&self) -> Cow<'_, str> {
        Cow::Borrowed("array")
    }

    /// Total number of entries, including those the engine will not display.
    fn len(&self) -> usize;

    /// Returns true when there are no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visits entries in iteration order until `visit` breaks.
    fn for_each_entry(&self, visit: &mut dyn FnMut(Key<'_>, &dyn Inspect) -> ControlFlow<()>);
}

/// A composite value with named, visibility-tagged fields.
///
/// Field access never panics or propagates: a field that cannot be read reports a
/// [`FieldError`], which the engine renders as an inline sentinel.
pub trait Record {
    /// Class or struct name shown in the header.
    fn class_name(&self) -> Cow<'_, str>;

    /// Declared fields in display order.
    fn fields(&self) -> Result<Vec<FieldDescriptor>, FieldError>;

    /// Reads one field and hands its current value to `visit`.
    ///
    /// `visit` is called at most once, and only on success.
    fn read_field(
        &self,
        field: &FieldDescriptor,
        visit: &mut dyn FnMut(&dyn Inspect),
    ) -> Result<(), FieldError>;

    /// Short textual summary shown next to the class header.
    fn preview(&self) -> Option<Result<String, ConversionError>> {
        None
    }
}

/// Label of a sequence entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key<'a> {
    /// Positional index.
    Index(usize),
    /// Map key.
    Name(Cow<'a, str>),
}

impl<'a> Key<'a> {
    /// Builds a named key.
    pub fn name(name: impl Into<Cow<'a, str>>) -> Self {
        Key::Name(name.into())
    }
}

impl fmt::Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{}", i),
            Key::Name(name) => write!(f, "\"{}\"", escape_control(name)),
        }
    }
}

/// Visibility of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    /// One-character marker shown before the field name.
    pub fn marker(self) -> char {
        match self {
            Visibility::Public => '+',
            Visibility::Protected => '#',
            Visibility::Private => '-',
        }
    }

    /// Lowercase name (`public`, `protected`, `private`).
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name and visibility of a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: Cow<'static, str>,
    visibility: Visibility,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<Cow<'static, str>>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            visibility,
        }
    }

    pub fn public(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, Visibility::Public)
    }

    pub fn protected(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, Visibility::Protected)
    }

    pub fn private(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, Visibility::Private)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }
}

/// Why a record field could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Declared but never assigned.
    #[error("field is not initialized")]
    Uninitialized,

    /// The accessor failed.
    #[error("{0}")]
    Failed(String),

    /// The descriptor does not name a field of this record.
    #[error("no such field: {0}")]
    Missing(String),
}

/// Failure of a record's textual preview.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConversionError(pub String);

impl From<String> for ConversionError {
    fn from(message: String) -> Self {
        ConversionError(message)
    }
}

impl From<&str> for ConversionError {
    fn from(message: &str) -> Self {
        ConversionError(message.to_string())
    }
}

/// Opaque per-allocation token used for cycle detection.
///
/// Two tokens are equal when they were derived from the same allocation. The raw
/// value is never shown to users; renderers display per-call handles instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity(usize);

impl Identity {
    /// Derives a token from a pointer. Metadata of wide pointers is discarded.
    pub fn of<T: ?Sized>(ptr: *const T) -> Self {
        Identity(ptr.cast::<()>() as usize)
    }

    /// Builds a token from a caller-managed id.
    pub fn from_raw(raw: usize) -> Self {
        Identity(raw)
    }
}

/// Descriptor of a resource-like handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handle {
    kind: Cow<'static, str>,
    id: Option<u64>,
}

impl Handle {
    pub fn new(kind: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
        }
    }

    /// Sets the numeric id (file descriptor, pid, ...).
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }
}
