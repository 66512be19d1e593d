//! Per-execution call stack and the policy shaping rules.
//!
//! An [`ExecutionState`] is owned by exactly one thread at a time and is
//! never locked. The thread-local binding lives in `thread_local.rs`; this
//! module only knows how frames are pushed, finalized and attached.

use std::sync::Arc;
use std::time::Instant;

use crate::config::TracingLevel;
use crate::event::{CapturedError, MethodSignature, TraceNode, TraceOutcome};
use crate::tree::TraceTree;

/// How an in-flight call ended.
#[derive(Debug, Clone)]
pub(crate) enum FrameExit {
    Returned(Option<String>),
    Threw {
        error: CapturedError,
        error_context: Option<String>,
    },
}

impl FrameExit {
    fn is_error(&self) -> bool {
        matches!(self, FrameExit::Threw { .. })
    }
}

/// What happens to a popped frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Disposition {
    /// Finalize into a node and attach it to the parent.
    Keep,
    /// Drop the frame but attach its finished children to the parent.
    Splice,
    /// Drop the frame and its whole subtree.
    Discard,
}

/// Shaping rule for a frame finishing under `level`.
///
/// `has_kept_children` is about the frame's children at this instant, and
/// `is_outermost` means the stack is empty once the frame is popped.
pub(crate) fn disposition(
    level: TracingLevel,
    is_error: bool,
    has_kept_children: bool,
    is_outermost: bool,
) -> Disposition {
    match level {
        TracingLevel::Off => Disposition::Discard,
        TracingLevel::Errors if is_error => Disposition::Keep,
        TracingLevel::Errors => Disposition::Splice,
        TracingLevel::Summary if is_error || is_outermost || !has_kept_children => {
            Disposition::Keep
        }
        TracingLevel::Summary => Disposition::Splice,
        TracingLevel::Narrative | TracingLevel::Detail => Disposition::Keep,
    }
}

/// An in-flight call.
#[derive(Debug)]
pub(crate) struct CallFrame {
    signature: MethodSignature,
    started: Instant,
    children: Vec<Arc<TraceNode>>,
}

impl CallFrame {
    fn new(signature: MethodSignature) -> Self {
        Self {
            signature,
            started: Instant::now(),
            children: Vec::new(),
        }
    }

    fn finish(self, exit: FrameExit) -> TraceNode {
        let duration_nanos = u64::try_from(self.started.elapsed().as_nanos()).unwrap_or(u64::MAX);
        let mut signature = self.signature;
        let outcome = match exit {
            FrameExit::Returned(rendered_value) => TraceOutcome::Returned { rendered_value },
            FrameExit::Threw {
                error,
                error_context,
            } => {
                if let Some(context) = error_context {
                    signature.replace_error_context(context);
                }
                TraceOutcome::Threw {
                    error,
                    error_context_in_signature: signature.error_context().is_some(),
                }
            }
        };
        TraceNode::new(signature, self.children, outcome, duration_nanos)
    }
}

/// One stack of in-flight frames plus the finished roots.
#[derive(Debug, Default)]
pub(crate) struct ExecutionState {
    stack: Vec<CallFrame>,
    roots: Vec<Arc<TraceNode>>,
}

impl ExecutionState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Push a frame. The parameter-value decision is taken here, with the
    /// level in effect at entry.
    pub(crate) fn push(&mut self, signature: MethodSignature, level: TracingLevel) {
        let signature = if level.keeps_parameter_values() {
            signature
        } else {
            signature.without_parameter_values()
        };
        self.stack.push(CallFrame::new(signature));
    }

    /// Pop the top frame and shape it with the level in effect now.
    ///
    /// The pop itself is unconditional so the stack stays balanced across
    /// level changes. Returns `false` when there was nothing to pop.
    pub(crate) fn pop(&mut self, exit: FrameExit, level: TracingLevel) -> bool {
        let Some(frame) = self.stack.pop() else {
            return false;
        };

        let is_outermost = self.stack.is_empty();
        match disposition(level, exit.is_error(), !frame.children.is_empty(), is_outermost) {
            Disposition::Keep => {
                let node = Arc::new(frame.finish(exit));
                self.attach(std::iter::once(node));
            }
            Disposition::Splice => self.attach(frame.children),
            Disposition::Discard => {}
        }
        true
    }

    fn attach(&mut self, nodes: impl IntoIterator<Item = Arc<TraceNode>>) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.extend(nodes),
            None => self.roots.extend(nodes),
        }
    }

    /// Number of in-flight frames.
    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Finished roots only; frames still on the stack are not visible.
    pub(crate) fn capture(&self) -> TraceTree {
        TraceTree::new(self.roots.clone())
    }
}
