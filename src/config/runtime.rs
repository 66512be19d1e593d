//! The runtime-mutable capture policy shared by every thread.

use std::sync::atomic::{AtomicU8, Ordering};

use super::level::TracingLevel;

/// Holds the active [`TracingLevel`].
///
/// The level lives in an atomic so any thread may change it while others
/// are reading it. Reads are relaxed: a reader may observe the previous
/// level for one event, but never a torn value.
///
/// ```
/// use narrativetrace::config::{TraceConfig, TracingLevel};
///
/// let config = TraceConfig::new(TracingLevel::Narrative);
/// config.set_level(TracingLevel::Detail);
/// assert_eq!(config.level(), TracingLevel::Detail);
/// ```
#[derive(Debug)]
pub struct TraceConfig {
    level: AtomicU8,
}

impl TraceConfig {
    pub const fn new(level: TracingLevel) -> Self {
        Self {
            level: AtomicU8::new(level as u8),
        }
    }

    /// Current level.
    #[inline]
    pub fn level(&self) -> TracingLevel {
        TracingLevel::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Change the level; visible to every thread sharing this config.
    pub fn set_level(&self, level: TracingLevel) {
        let previous = self.level.swap(level.as_u8(), Ordering::Relaxed);
        if previous != level.as_u8() {
            tracing::debug!(
                from = %TracingLevel::from_u8(previous),
                to = %level,
                "tracing level changed"
            );
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.level().is_active()
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self::new(TracingLevel::default())
    }
}

impl Clone for TraceConfig {
    fn clone(&self) -> Self {
        Self::new(self.level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_default_config_is_detail() {
        let config = TraceConfig::default();
        assert_eq!(config.level(), TracingLevel::Detail);
        assert!(config.is_active());
    }

    #[test]
    fn test_off_is_inactive() {
        let config = TraceConfig::new(TracingLevel::Off);
        assert!(!config.is_active());
    }

    #[test]
    fn test_level_change_is_visible_across_threads() {
        let config = Arc::new(TraceConfig::new(TracingLevel::Off));

        let writer = {
            let config = Arc::clone(&config);
            thread::spawn(move || config.set_level(TracingLevel::Summary))
        };
        writer.join().unwrap();

        let reader = {
            let config = Arc::clone(&config);
            thread::spawn(move || config.level())
        };
        assert_eq!(reader.join().unwrap(), TracingLevel::Summary);
    }

    #[test]
    fn test_concurrent_writes_never_produce_unknown_levels() {
        let config = Arc::new(TraceConfig::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let config = Arc::clone(&config);
                thread::spawn(move || {
                    for n in 0..1_000 {
                        config.set_level(TracingLevel::ALL[(i + n) % 5]);
                        let seen = config.level();
                        assert!(TracingLevel::ALL.contains(&seen));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
