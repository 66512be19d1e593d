//! Call-tree capture for a single logical execution.
//!
//! Instrumented code reports "entered X with these parameters", "X returned
//! Y" and "X failed with Z"; a [`NarrativeContext`] assembles those events
//! into an immutable [`TraceTree`], shaped by a runtime [`TracingLevel`],
//! and keeps executions that hop across threads isolated through
//! [`ContextSnapshot`] and [`ContextScope`].
//!
//! ```
//! use narrativetrace::{MethodSignature, NarrativeContext, ThreadLocalContext, TracingLevel};
//!
//! let context = ThreadLocalContext::new();
//! context.enter_method(
//!     MethodSignature::new("OrderService", "placeOrder").with_param("customerId", "\"C-123\""),
//! );
//! context.exit_method_with_return(Some("\"order-42\"".into()));
//!
//! let tree = context.capture_trace();
//! assert_eq!(tree.roots().len(), 1);
//!
//! context.config().set_level(TracingLevel::Off);
//! assert!(!context.is_active());
//! ```

// Export modules for library usage
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod export;
pub mod instrument;
pub mod observability;
pub mod render;
pub mod tree;

// Re-export commonly used types
pub use crate::config::{ConfigResolver, TraceConfig, TracingLevel};
pub use crate::context::{
    ContextScope, ContextSnapshot, LoggingContext, NarrativeContext, NoopContext,
    ThreadLocalContext,
};
pub use crate::error::{Error, Result};
pub use crate::event::{CapturedError, MethodSignature, ParameterCapture, TraceNode, TraceOutcome};
pub use crate::tree::TraceTree;
