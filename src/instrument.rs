//! Manual instrumentation: bracket a closure with the matching enter/exit.
//!
//! Both helpers return whatever the closure returned, untouched. Rendering
//! only happens while the context is active.
//!
//! ```
//! use narrativetrace::context::{NarrativeContext, ThreadLocalContext};
//! use narrativetrace::event::MethodSignature;
//! use narrativetrace::instrument::trace_call;
//!
//! let context = ThreadLocalContext::new();
//! let parsed = trace_call(
//!     &context,
//!     MethodSignature::new("Parser", "parsePort").with_param("raw", "\"80x\""),
//!     |port: &u16| port.to_string(),
//!     || "80x".parse::<u16>(),
//! );
//!
//! assert!(parsed.is_err());
//! let tree = context.capture_trace();
//! assert_eq!(tree.roots()[0].outcome().error().unwrap().type_name(), "ParseIntError");
//! ```

use std::panic::{self, AssertUnwindSafe};

use crate::context::NarrativeContext;
use crate::event::{CapturedError, MethodSignature};

/// Trace a fallible call. `Ok` values are rendered with `render`, `Err`
/// values are captured by reference and handed back to the caller as-is.
pub fn trace_call<C, T, E, R, F>(
    context: &C,
    signature: MethodSignature,
    render: R,
    call: F,
) -> Result<T, E>
where
    C: NarrativeContext + ?Sized,
    E: std::error::Error,
    R: FnOnce(&T) -> String,
    F: FnOnce() -> Result<T, E>,
{
    context.enter_method(signature);
    let result = run_guarded(context, call);
    match &result {
        Ok(value) => {
            let rendered = context.is_active().then(|| render(value));
            context.exit_method_with_return(rendered);
        }
        Err(error) => context.exit_method_with_error(CapturedError::from_error(error), None),
    }
    result
}

/// Trace an infallible call. A panic closes the frame with a `panic` error
/// outcome and then resumes unwinding unchanged.
pub fn trace_value<C, T, R, F>(context: &C, signature: MethodSignature, render: R, call: F) -> T
where
    C: NarrativeContext + ?Sized,
    R: FnOnce(&T) -> String,
    F: FnOnce() -> T,
{
    context.enter_method(signature);
    let value = run_guarded(context, call);
    let rendered = context.is_active().then(|| render(&value));
    context.exit_method_with_return(rendered);
    value
}

fn run_guarded<C, T, F>(context: &C, call: F) -> T
where
    C: NarrativeContext + ?Sized,
    F: FnOnce() -> T,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(value) => value,
        Err(payload) => {
            context.exit_method_with_error(CapturedError::from_panic(&*payload), None);
            panic::resume_unwind(payload)
        }
    }
}
