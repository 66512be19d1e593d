use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::outcome::TraceOutcome;
use super::signature::MethodSignature;

/// One finished call in a trace tree.
///
/// Nodes are built bottom-up by the context when a frame is finalized and
/// are never mutated afterwards. Children are shared through `Arc`, so
/// handing out a tree is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceNode {
    signature: MethodSignature,
    children: Vec<Arc<TraceNode>>,
    outcome: TraceOutcome,
    duration_nanos: u64,
}

impl TraceNode {
    pub fn new(
        signature: MethodSignature,
        children: Vec<Arc<TraceNode>>,
        outcome: TraceOutcome,
        duration_nanos: u64,
    ) -> Self {
        Self {
            signature,
            children,
            outcome,
            duration_nanos,
        }
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// Nested calls, in the order they were entered.
    pub fn children(&self) -> &[Arc<TraceNode>] {
        &self.children
    }

    pub fn outcome(&self) -> &TraceOutcome {
        &self.outcome
    }

    pub fn duration_nanos(&self) -> u64 {
        self.duration_nanos
    }

    pub fn duration(&self) -> Duration {
        Duration::from_nanos(self.duration_nanos)
    }

    pub fn duration_millis(&self) -> u64 {
        self.duration_nanos / 1_000_000
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Depth-first, pre-order walk over this subtree.
    pub fn walk(&self) -> impl Iterator<Item = &TraceNode> {
        let mut pending: Vec<&TraceNode> = vec![self];
        std::iter::from_fn(move || {
            let node = pending.pop()?;
            pending.extend(node.children.iter().rev().map(Arc::as_ref));
            Some(node)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(method: &str) -> Arc<TraceNode> {
        Arc::new(TraceNode::new(
            MethodSignature::new("Svc", method),
            Vec::new(),
            TraceOutcome::returned(None),
            1_500_000,
        ))
    }

    #[test]
    fn test_walk_is_pre_order() {
        let mid = Arc::new(TraceNode::new(
            MethodSignature::new("Svc", "mid"),
            vec![leaf("c"), leaf("d")],
            TraceOutcome::returned(None),
            0,
        ));
        let root = TraceNode::new(
            MethodSignature::new("Svc", "root"),
            vec![leaf("a"), mid, leaf("e")],
            TraceOutcome::returned(None),
            0,
        );

        let order: Vec<_> = root.walk().map(|n| n.signature().method_name()).collect();
        assert_eq!(order, vec!["root", "a", "mid", "c", "d", "e"]);
        assert_eq!(root.node_count(), 6);
    }

    #[test]
    fn test_duration_conversions() {
        let node = leaf("a");
        assert_eq!(node.duration_millis(), 1);
        assert_eq!(node.duration(), Duration::from_micros(1_500));
    }
}
