//! Turning a finished [`TraceTree`] into text.
//!
//! Renderers are read-only consumers; they never see in-flight calls and
//! cannot influence how a tree is built.

mod indented;

pub use indented::IndentedTextRenderer;

use crate::tree::TraceTree;

/// Anything that turns a finished tree into a string.
///
/// Implemented for plain functions and closures so ad-hoc renderers can be
/// passed wherever a renderer is expected.
pub trait NarrativeRenderer {
    fn render(&self, tree: &TraceTree) -> String;
}

impl<F> NarrativeRenderer for F
where
    F: Fn(&TraceTree) -> String,
{
    fn render(&self, tree: &TraceTree) -> String {
        self(tree)
    }
}
