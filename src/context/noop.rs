use super::snapshot::ContextSnapshot;
use super::NarrativeContext;
use crate::event::{CapturedError, MethodSignature};
use crate::tree::TraceTree;

/// Context that records nothing, for when tracing is disabled outright.
///
/// Instrumentation can check [`is_active`](NarrativeContext::is_active)
/// and skip rendering parameters altogether.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopContext;

impl NoopContext {
    pub const fn new() -> Self {
        NoopContext
    }
}

impl NarrativeContext for NoopContext {
    fn is_active(&self) -> bool {
        false
    }

    fn enter_method(&self, _signature: MethodSignature) {}

    fn exit_method_with_return(&self, _rendered_value: Option<String>) {}

    fn exit_method_with_error(&self, _error: CapturedError, _error_context: Option<String>) {}

    fn capture_trace(&self) -> TraceTree {
        TraceTree::empty()
    }

    fn reset(&self) {}

    fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot::noop()
    }
}
