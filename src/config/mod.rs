//! Capture policy configuration.
//!
//! [`TracingLevel`] names how much detail is kept, [`TraceConfig`] holds the
//! level that every context consults on each event, and [`ConfigResolver`]
//! picks the starting level from the environment or a `narrativetrace.toml`.

mod level;
mod loader;
mod runtime;

pub use level::TracingLevel;
pub use loader::{
    directory_ancestors, parse_config, ConfigResolver, FileConfig, CONFIG_FILE_NAMES,
    LEVEL_ENV_VAR,
};
pub use runtime::TraceConfig;
