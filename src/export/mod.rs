//! Machine-readable exports of finished trees.

mod json;

pub use json::{JsonExporter, TraceMetadata};
