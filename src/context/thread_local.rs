//! Default context: one [`ExecutionState`] per thread, no locks.
//!
//! ## Thread Safety
//!
//! - Per-thread state: each thread keeps its own map of execution states
//!   (via `thread_local!`), keyed by context id so two contexts used on the
//!   same thread never share a stack
//! - Shared policy: the only cross-thread value is the atomic level in
//!   [`TraceConfig`]
//! - Handoff: [`ContextSnapshot`] swaps a fresh state in and an RAII
//!   [`ContextScope`](super::ContextScope) swaps the previous one back

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use super::snapshot::ContextSnapshot;
use super::state::{ExecutionState, FrameExit};
use super::NarrativeContext;
use crate::config::{TraceConfig, TracingLevel};
use crate::event::{CapturedError, MethodSignature};
use crate::tree::TraceTree;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static EXECUTION_STATES: RefCell<HashMap<ContextId, Binding>> =
        RefCell::new(HashMap::new());
}

/// Process-unique identity of a [`ThreadLocalContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        Self(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A thread's state for one context, tied to the context's lifetime.
struct Binding {
    owner: Weak<ContextInner>,
    state: ExecutionState,
}

/// Drop every binding whose context no longer exists.
fn sweep_dropped(states: &mut HashMap<ContextId, Binding>) {
    let before = states.len();
    states.retain(|_, binding| binding.owner.strong_count() > 0);
    let released = before - states.len();
    if released > 0 {
        tracing::trace!(
            target: "narrativetrace",
            released,
            "released states of dropped contexts"
        );
    }
}

/// Run `f` against the calling thread's state for `inner`, creating it on
/// first use. Returns `None` while the thread is tearing down its locals.
fn with_state<R>(
    inner: &Arc<ContextInner>,
    f: impl FnOnce(&mut ExecutionState) -> R,
) -> Option<R> {
    EXECUTION_STATES
        .try_with(|states| {
            let mut states = states.try_borrow_mut().ok()?;
            if !states.contains_key(&inner.id) {
                sweep_dropped(&mut states);
                states.insert(
                    inner.id,
                    Binding {
                        owner: Arc::downgrade(inner),
                        state: ExecutionState::new(),
                    },
                );
            }
            states.get_mut(&inner.id).map(|binding| f(&mut binding.state))
        })
        .ok()
        .flatten()
}

/// Read the calling thread's state for `id` without creating it.
fn read_state<R>(id: ContextId, f: impl FnOnce(Option<&ExecutionState>) -> R) -> Option<R> {
    EXECUTION_STATES
        .try_with(|states| {
            let states = states.try_borrow().ok()?;
            Some(f(states.get(&id).map(|binding| &binding.state)))
        })
        .ok()
        .flatten()
}

/// Number of bindings held by the calling thread, live or not.
#[cfg(test)]
pub(crate) fn bound_state_count() -> usize {
    EXECUTION_STATES.with(|states| states.borrow().len())
}

/// Weak reference to a context, as held by snapshots and scopes.
#[derive(Clone)]
pub(crate) struct ContextHandle {
    id: ContextId,
    owner: Weak<ContextInner>,
}

impl ContextHandle {
    pub(crate) fn is_live(&self) -> bool {
        self.owner.strong_count() > 0
    }

    /// Bind `replacement` as the calling thread's state for this context and
    /// hand back whatever was bound before. `None` unbinds, and so does any
    /// replacement once the context is gone.
    pub(crate) fn swap_state(
        &self,
        replacement: Option<ExecutionState>,
    ) -> Option<ExecutionState> {
        EXECUTION_STATES
            .try_with(|states| {
                let mut states = states.try_borrow_mut().ok()?;
                let previous = match replacement.filter(|_| self.is_live()) {
                    Some(state) => {
                        if !states.contains_key(&self.id) {
                            sweep_dropped(&mut states);
                        }
                        states.insert(
                            self.id,
                            Binding {
                                owner: self.owner.clone(),
                                state,
                            },
                        )
                    }
                    None => states.remove(&self.id),
                };
                previous.map(|binding| binding.state)
            })
            .ok()
            .flatten()
    }
}

impl fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextHandle")
            .field("id", &self.id.0)
            .field("live", &self.is_live())
            .finish()
    }
}

pub(crate) struct ContextInner {
    id: ContextId,
    config: Arc<TraceConfig>,
}

impl Drop for ContextInner {
    // Other threads sweep their bindings on their next insert.
    fn drop(&mut self) {
        let _ = EXECUTION_STATES.try_with(|states| {
            if let Ok(mut states) = states.try_borrow_mut() {
                states.remove(&self.id);
            }
        });
    }
}

/// Call-tree builder backed by thread-local storage.
///
/// Cloning is cheap and clones share both the policy and the per-thread
/// states, so a clone moved to another thread sees that thread's state,
/// never the original thread's.
///
/// ```
/// use narrativetrace::context::{NarrativeContext, ThreadLocalContext};
/// use narrativetrace::event::MethodSignature;
///
/// let context = ThreadLocalContext::new();
/// context.enter_method(MethodSignature::new("OrderService", "placeOrder"));
/// context.exit_method_with_return(Some("\"order-42\"".into()));
///
/// assert_eq!(context.capture_trace().roots().len(), 1);
/// ```
#[derive(Clone)]
pub struct ThreadLocalContext {
    inner: Arc<ContextInner>,
}

impl ThreadLocalContext {
    /// Context with its own config at the default level (`Detail`).
    pub fn new() -> Self {
        Self::with_config(Arc::new(TraceConfig::default()))
    }

    /// Context with its own config at `level`.
    pub fn with_level(level: TracingLevel) -> Self {
        Self::with_config(Arc::new(TraceConfig::new(level)))
    }

    /// Context sharing `config`; level changes through it apply immediately.
    pub fn with_config(config: Arc<TraceConfig>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                id: ContextId::next(),
                config,
            }),
        }
    }

    pub fn config(&self) -> &Arc<TraceConfig> {
        &self.inner.config
    }

    pub fn level(&self) -> TracingLevel {
        self.inner.config.level()
    }

    /// Number of calls currently in flight on the calling thread.
    pub fn depth(&self) -> usize {
        read_state(self.inner.id, |state| state.map_or(0, ExecutionState::depth)).unwrap_or(0)
    }

    #[cfg(test)]
    pub(crate) fn id(&self) -> ContextId {
        self.inner.id
    }

    pub(crate) fn handle(&self) -> ContextHandle {
        ContextHandle {
            id: self.inner.id,
            owner: Arc::downgrade(&self.inner),
        }
    }

    fn exit(&self, exit: FrameExit) {
        // Sampled before touching the stack so the pop below is
        // unconditional whatever the level says.
        let level = self.level();
        let popped = with_state(&self.inner, |state| state.pop(exit, level)).unwrap_or(false);
        if !popped {
            tracing::trace!(target: "narrativetrace", "exit without a matching frame ignored");
        }
    }
}

impl Default for ThreadLocalContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ThreadLocalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadLocalContext")
            .field("id", &self.inner.id.0)
            .field("level", &self.level())
            .finish()
    }
}

impl NarrativeContext for ThreadLocalContext {
    fn is_active(&self) -> bool {
        self.inner.config.is_active()
    }

    fn enter_method(&self, signature: MethodSignature) {
        let level = self.level();
        if !level.is_active() {
            return;
        }
        with_state(&self.inner, |state| state.push(signature, level));
    }

    fn exit_method_with_return(&self, rendered_value: Option<String>) {
        self.exit(FrameExit::Returned(rendered_value));
    }

    fn exit_method_with_error(&self, error: CapturedError, error_context: Option<String>) {
        self.exit(FrameExit::Threw {
            error,
            error_context,
        });
    }

    fn capture_trace(&self) -> TraceTree {
        read_state(self.inner.id, |state| {
            state.map(ExecutionState::capture).unwrap_or_default()
        })
        .unwrap_or_default()
    }

    fn reset(&self) {
        self.handle().swap_state(None);
    }

    fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot::bound_to(self.handle())
    }
}
