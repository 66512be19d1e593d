//! Recording calls into a per-execution trace.
//!
//! [`NarrativeContext`] is the whole surface instrumentation talks to:
//! enter a call, exit it with a value or an error, read the finished tree,
//! reset, and take a [`ContextSnapshot`] to continue on another thread.
//!
//! ## Implementations
//!
//! - [`ThreadLocalContext`]: the default; one lock-free stack per thread
//! - [`NoopContext`]: records nothing
//! - [`LoggingContext`]: mirrors events into `tracing` around any delegate
//!
//! ## Usage
//!
//! ```
//! use narrativetrace::config::TracingLevel;
//! use narrativetrace::context::{NarrativeContext, ThreadLocalContext};
//! use narrativetrace::event::{CapturedError, MethodSignature};
//!
//! let context = ThreadLocalContext::with_level(TracingLevel::Detail);
//!
//! context.enter_method(MethodSignature::new("OrderService", "placeOrder"));
//! context.enter_method(MethodSignature::new("PaymentService", "charge"));
//! let err = "x".parse::<u32>().unwrap_err();
//! context.exit_method_with_error(CapturedError::from_error(&err), None);
//! context.exit_method_with_return(Some("\"order-42\"".into()));
//!
//! let tree = context.capture_trace();
//! assert_eq!(tree.roots()[0].children().len(), 1);
//! ```

mod logging;
mod noop;
pub mod parallel;
mod snapshot;
mod state;
mod thread_local;

pub use logging::{EventKind, LoggingContext, LOG_TARGET};
pub use noop::NoopContext;
pub use snapshot::{ContextScope, ContextSnapshot};
pub use thread_local::ThreadLocalContext;

use std::sync::Arc;

use crate::event::{CapturedError, MethodSignature};
use crate::tree::TraceTree;

/// Records method entries and exits into a call tree.
///
/// Every `enter_method` that records a frame must be matched by exactly one
/// exit. Implementations never panic or return errors for misuse: an exit
/// with nothing to pop is ignored.
pub trait NarrativeContext: Send + Sync {
    /// Whether events are being recorded at all. Instrumentation may skip
    /// rendering parameters when this is `false`.
    fn is_active(&self) -> bool {
        true
    }

    fn enter_method(&self, signature: MethodSignature);

    /// Record a normal return; `None` for calls without a value.
    fn exit_method_with_return(&self, rendered_value: Option<String>);

    /// Record an exit through an error. `error_context`, when present,
    /// replaces the signature's error context on the finished node.
    ///
    /// The caller still owns the real error and must propagate it unchanged.
    fn exit_method_with_error(&self, error: CapturedError, error_context: Option<String>);

    /// Finished roots for the calling thread. Never mutates anything.
    fn capture_trace(&self) -> TraceTree;

    /// Clear the calling thread's stack and roots.
    fn reset(&self);

    /// Handle for continuing on another thread with a fresh, empty trace.
    fn snapshot(&self) -> ContextSnapshot;
}

impl<C: NarrativeContext + ?Sized> NarrativeContext for Arc<C> {
    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn enter_method(&self, signature: MethodSignature) {
        (**self).enter_method(signature)
    }

    fn exit_method_with_return(&self, rendered_value: Option<String>) {
        (**self).exit_method_with_return(rendered_value)
    }

    fn exit_method_with_error(&self, error: CapturedError, error_context: Option<String>) {
        (**self).exit_method_with_error(error, error_context)
    }

    fn capture_trace(&self) -> TraceTree {
        (**self).capture_trace()
    }

    fn reset(&self) {
        (**self).reset()
    }

    fn snapshot(&self) -> ContextSnapshot {
        (**self).snapshot()
    }
}
