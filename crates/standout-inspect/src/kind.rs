//! Value classification.
//!
//! [`classify`] maps any inspectable value to exactly one [`Kind`]. The kind is the
//! dispatch key the engine uses to pick a renderer. Classification is total:
//! anything without a better fit is [`Kind::Unsupported`].

use std::fmt;

use crate::value::{Inspect, Node};

/// Semantic category of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    Integer,
    Float,
    Boolean,
    Null,
    Sequence,
    Record,
    ExternalHandle,
    Unsupported,
}

impl Kind {
    /// All kinds, in declaration order.
    pub const ALL: [Kind; 9] = [
        Kind::String,
        Kind::Integer,
        Kind::Float,
        Kind::Boolean,
        Kind::Null,
        Kind::Sequence,
        Kind::Record,
        Kind::ExternalHandle,
        Kind::Unsupported,
    ];

    /// Classifies an already-inspected node.
    pub fn of(node: &Node<'_>) -> Kind {
        match node {
            Node::Null => Kind::Null,
            Node::Bool(_) => Kind::Boolean,
            Node::Int(_) => Kind::Integer,
            Node::Float(_) => Kind::Float,
            Node::Str(_) => Kind::String,
            Node::Sequence { .. } => Kind::Sequence,
            Node::Record { .. } => Kind::Record,
            Node::Handle(_) => Kind::ExternalHandle,
            Node::Unsupported(_) => Kind::Unsupported,
        }
    }

    /// True for kinds with children.
    pub fn is_composite(self) -> bool {
        matches!(self, Kind::Sequence | Kind::Record)
    }

    /// True for the scalar families.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            Kind::String | Kind::Integer | Kind::Float | Kind::Boolean | Kind::Null
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::Boolean => "boolean",
            Kind::Null => "null",
            Kind::Sequence => "sequence",
            Kind::Record => "record",
            Kind::ExternalHandle => "external-handle",
            Kind::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a value.
///
/// ```rust
/// use standout_inspect::{classify, Kind};
///
/// assert_eq!(classify(&"text"), Kind::String);
/// assert_eq!(classify(&vec![1, 2]), Kind::Sequence);
/// assert_eq!(classify(&None::<u8>), Kind::Null);
/// ```
pub fn classify(value: &dyn Inspect) -> Kind {
    Kind::of(&value.inspect())
}
