//! Immutable trace values: signatures, parameters, outcomes and nodes.

mod node;
mod outcome;
mod signature;

pub use node::TraceNode;
pub use outcome::{CapturedError, TraceOutcome};
pub use signature::{MethodSignature, ParameterCapture};
