//! Per-call traversal state.
//!
//! A fresh [`RenderContext`] and [`VisitedSet`] are created for every top-level
//! value and dropped once its subtree is rendered. The only state that outlives a
//! call is the node id counter behind [`next_node_id`], which the interactive
//! renderer uses for collapsible anchors.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::value::Identity;

/// Scoped state threaded through the recursion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    pub(crate) depth: usize,
    pub(crate) inline: bool,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nesting depth. The top-level value is at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// True when the current node shares a line with a label its caller emitted.
    pub fn is_inline(&self) -> bool {
        self.inline
    }
}

/// Identities of the composites on the current traversal path.
///
/// An identity is present only while its subtree is being rendered, so the same
/// object reached through two sibling branches renders fully both times.
#[derive(Debug, Default)]
pub struct VisitedSet {
    active: HashSet<Identity>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an identity as entered. Returns false if it was already on the path.
    pub fn enter(&mut self, id: Identity) -> bool {
        self.active.insert(id)
    }

    pub fn leave(&mut self, id: Identity) {
        self.active.remove(&id);
    }

    pub fn contains(&self, id: Identity) -> bool {
        self.active.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Per-call numbering of identities, in first-seen order starting at 1.
///
/// Raw identities are addresses; users see these small stable numbers instead.
#[derive(Debug, Default)]
pub struct HandleTable {
    handles: HashMap<Identity, usize>,
}

impl HandleTable {
    pub fn handle_for(&mut self, id: Identity) -> usize {
        let next = self.handles.len() + 1;
        *self.handles.entry(id).or_insert(next)
    }
}

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Returns a process-unique, monotonically increasing node id.
pub fn next_node_id() -> u64 {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}
