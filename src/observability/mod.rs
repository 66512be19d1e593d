//! Diagnostics for the library itself.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the application. [`init_tracing`] is a convenience for binaries, demos
//! and benches that want readable output on stderr without wiring
//! `tracing-subscriber` themselves.
//!
//! ```no_run
//! narrativetrace::observability::init_tracing("narrativetrace=debug");
//! ```

mod subscriber;

pub use subscriber::{init_tracing, DEFAULT_FILTER};
