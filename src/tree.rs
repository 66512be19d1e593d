//! The finished, read-only output of a trace.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::event::TraceNode;
use crate::render::{IndentedTextRenderer, NarrativeRenderer};

/// Ordered list of finished root calls.
///
/// This is the only value renderers and analyzers ever see. It holds
/// completed nodes only; calls still in flight are never part of a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraceTree {
    roots: Vec<Arc<TraceNode>>,
}

impl TraceTree {
    pub fn new(roots: Vec<Arc<TraceNode>>) -> Self {
        Self { roots }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[Arc<TraceNode>] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes across all roots.
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(|r| r.node_count()).sum()
    }

    /// Depth-first walk over every node of every root.
    pub fn walk(&self) -> impl Iterator<Item = &TraceNode> {
        self.roots.iter().flat_map(|root| root.walk())
    }

    /// True if any node in the tree completed with an error.
    pub fn has_errors(&self) -> bool {
        self.walk().any(|node| node.outcome().is_error())
    }
}

impl fmt::Display for TraceTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&IndentedTextRenderer::new().render(self))
    }
}
