use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

/// Directive used when neither `RUST_LOG` nor the caller supplies one.
pub const DEFAULT_FILTER: &str = "narrativetrace=info";

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Install a stderr fmt subscriber filtered by `RUST_LOG`, falling back to
/// `filter` (or [`DEFAULT_FILTER`] when `filter` is empty).
///
/// Only the first call does anything. Returns `true` if this process's
/// global subscriber is the one installed here; `false` if another
/// subscriber was already set.
pub fn init_tracing(filter: &str) -> bool {
    *INSTALLED.get_or_init(|| {
        let directive = if filter.trim().is_empty() {
            DEFAULT_FILTER
        } else {
            filter
        };
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

        let installed = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_names(true)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok();
        if installed {
            tracing::debug!(directive, "narrativetrace diagnostics enabled");
        }
        installed
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let first = init_tracing("narrativetrace=trace");
        let second = init_tracing("");
        assert_eq!(first, second);
    }
}
