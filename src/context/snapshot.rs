//! Handing a trace over to another worker.
//!
//! A [`ContextSnapshot`] is a reusable handle that starts a fresh, empty
//! execution on whatever thread activates it. Activation returns a
//! [`ContextScope`] guard; dropping the guard puts back exactly the state
//! the thread had before, so pooled threads are left as they were found.
//!
//! ```
//! use narrativetrace::context::{NarrativeContext, ThreadLocalContext};
//! use narrativetrace::event::MethodSignature;
//!
//! let context = ThreadLocalContext::new();
//! let snapshot = context.snapshot();
//!
//! let worker_context = context.clone();
//! let task = snapshot.wrap(move || {
//!     worker_context.enter_method(MethodSignature::new("Worker", "run"));
//!     worker_context.exit_method_with_return(None);
//!     worker_context.capture_trace()
//! });
//! let tree = std::thread::spawn(task).join().unwrap();
//! assert_eq!(tree.roots().len(), 1);
//! ```

use std::marker::PhantomData;

use super::state::ExecutionState;
use super::thread_local::ContextHandle;

/// Reusable handle for starting an isolated trace on any thread.
///
/// Snapshots are `Clone + Send + Sync`; activating the same snapshot on many
/// threads at once is the intended use. A snapshot does not keep its context
/// alive: once the context is dropped, activation does nothing.
#[derive(Debug, Clone)]
pub struct ContextSnapshot {
    target: Option<ContextHandle>,
}

impl ContextSnapshot {
    pub(crate) fn bound_to(handle: ContextHandle) -> Self {
        Self {
            target: Some(handle),
        }
    }

    /// Snapshot whose activation does nothing.
    pub fn noop() -> Self {
        Self { target: None }
    }

    /// Install a fresh execution on the calling thread.
    ///
    /// The returned scope must stay on this thread; dropping or closing it
    /// restores whatever was bound before, including "nothing".
    #[must_use = "dropping the scope immediately restores the previous trace"]
    pub fn activate(&self) -> ContextScope {
        let restore = self
            .target
            .as_ref()
            .filter(|handle| handle.is_live())
            .map(|handle| {
                let previous = handle.swap_state(Some(ExecutionState::new()));
                (handle.clone(), previous)
            });
        ContextScope {
            restore,
            _not_send: PhantomData,
        }
    }

    /// Decorate a one-shot task so it runs inside its own activation.
    ///
    /// The scope is closed on every exit path, including unwinding, before
    /// the task's result or panic reaches the caller.
    pub fn wrap<F, R>(&self, task: F) -> impl FnOnce() -> R + Send
    where
        F: FnOnce() -> R + Send,
    {
        let snapshot = self.clone();
        move || {
            let _scope = snapshot.activate();
            task()
        }
    }

    /// Decorate a reusable task; every invocation gets a fresh activation.
    pub fn wrap_fn<F, R>(&self, task: F) -> impl Fn() -> R + Send + Sync
    where
        F: Fn() -> R + Send + Sync,
    {
        let snapshot = self.clone();
        move || {
            let _scope = snapshot.activate();
            task()
        }
    }
}

/// Save/restore guard returned by [`ContextSnapshot::activate`].
///
/// Not `Send`: the state it restores belongs to the activating thread.
#[must_use = "dropping the scope immediately restores the previous trace"]
pub struct ContextScope {
    restore: Option<(ContextHandle, Option<ExecutionState>)>,
    _not_send: PhantomData<*const ()>,
}

impl ContextScope {
    /// Restore the previous state now. Equivalent to dropping the scope.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for ContextScope {
    fn drop(&mut self) {
        if let Some((handle, previous)) = self.restore.take() {
            handle.swap_state(previous);
        }
    }
}

impl std::fmt::Debug for ContextScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextScope")
            .field("bound", &self.restore.is_some())
            .finish()
    }
}
