//! Context decorator that mirrors every trace event into `tracing`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::Level;

use super::snapshot::ContextSnapshot;
use super::NarrativeContext;
use crate::event::{CapturedError, MethodSignature, ParameterCapture};
use crate::tree::TraceTree;

/// Target used for every event this decorator emits.
pub const LOG_TARGET: &str = "narrativetrace";

static NEXT_LOGGER_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CALL_DEPTHS: RefCell<HashMap<u64, usize>> = RefCell::new(HashMap::new());
}

/// Trace events whose log level can be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Entry,
    Return,
    Error,
}

macro_rules! event_at {
    ($level:expr, $($arg:tt)+) => {{
        let level: Level = $level;
        if level == Level::ERROR {
            tracing::event!(target: LOG_TARGET, Level::ERROR, $($arg)+)
        } else if level == Level::WARN {
            tracing::event!(target: LOG_TARGET, Level::WARN, $($arg)+)
        } else if level == Level::INFO {
            tracing::event!(target: LOG_TARGET, Level::INFO, $($arg)+)
        } else if level == Level::DEBUG {
            tracing::event!(target: LOG_TARGET, Level::DEBUG, $($arg)+)
        } else {
            tracing::event!(target: LOG_TARGET, Level::TRACE, $($arg)+)
        }
    }};
}

/// Wraps any [`NarrativeContext`] and logs each entry, return and error
/// through `tracing` before delegating.
///
/// Defaults: entries and returns at `TRACE`, errors at `WARN`. Events carry
/// `class`, `method` and `depth` fields; redacted parameters are logged as
/// `[REDACTED]`.
#[derive(Debug)]
pub struct LoggingContext<C> {
    delegate: C,
    id: u64,
    entry_level: Level,
    return_level: Level,
    error_level: Level,
}

impl<C: NarrativeContext> LoggingContext<C> {
    pub fn new(delegate: C) -> Self {
        Self {
            delegate,
            id: NEXT_LOGGER_ID.fetch_add(1, Ordering::Relaxed),
            entry_level: Level::TRACE,
            return_level: Level::TRACE,
            error_level: Level::WARN,
        }
    }

    /// Override the level used for one kind of event.
    pub fn with_level(mut self, kind: EventKind, level: Level) -> Self {
        match kind {
            EventKind::Entry => self.entry_level = level,
            EventKind::Return => self.return_level = level,
            EventKind::Error => self.error_level = level,
        }
        self
    }

    pub fn level_for(&self, kind: EventKind) -> Level {
        match kind {
            EventKind::Entry => self.entry_level,
            EventKind::Return => self.return_level,
            EventKind::Error => self.error_level,
        }
    }

    pub fn delegate(&self) -> &C {
        &self.delegate
    }

    /// Apply `change` to this thread's depth and return the new value.
    fn adjust_depth(&self, change: impl FnOnce(usize) -> usize) -> usize {
        CALL_DEPTHS
            .try_with(|depths| {
                let mut depths = depths.borrow_mut();
                let depth = depths.entry(self.id).or_insert(0);
                *depth = change(*depth);
                *depth
            })
            .unwrap_or(0)
    }
}

impl<C> Drop for LoggingContext<C> {
    fn drop(&mut self) {
        let _ = CALL_DEPTHS.try_with(|depths| depths.borrow_mut().remove(&self.id));
    }
}

fn format_params(parameters: &[ParameterCapture]) -> String {
    parameters
        .iter()
        .map(|p| {
            if p.is_redacted() {
                format!("{}: [REDACTED]", p.name())
            } else {
                format!("{}: {}", p.name(), p.rendered_value())
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl<C: NarrativeContext> NarrativeContext for LoggingContext<C> {
    fn is_active(&self) -> bool {
        self.delegate.is_active()
    }

    fn enter_method(&self, signature: MethodSignature) {
        let depth = self.adjust_depth(|d| d + 1);
        event_at!(
            self.entry_level,
            class = signature.class_name(),
            method = signature.method_name(),
            depth,
            "→ {}.{}({})",
            signature.class_name(),
            signature.method_name(),
            format_params(signature.parameters())
        );
        self.delegate.enter_method(signature);
    }

    fn exit_method_with_return(&self, rendered_value: Option<String>) {
        let depth = self.adjust_depth(|d| d.saturating_sub(1));
        event_at!(
            self.return_level,
            depth,
            "← returned: {}",
            rendered_value.as_deref().unwrap_or("()")
        );
        self.delegate.exit_method_with_return(rendered_value);
    }

    fn exit_method_with_error(&self, error: CapturedError, error_context: Option<String>) {
        let depth = self.adjust_depth(|d| d.saturating_sub(1));
        match error_context.as_deref() {
            Some(context) => event_at!(
                self.error_level,
                depth,
                "!! {}: {} [{}]",
                error.type_name(),
                error.message(),
                context
            ),
            None => event_at!(
                self.error_level,
                depth,
                "!! {}: {}",
                error.type_name(),
                error.message()
            ),
        }
        self.delegate.exit_method_with_error(error, error_context);
    }

    fn capture_trace(&self) -> TraceTree {
        self.delegate.capture_trace()
    }

    fn reset(&self) {
        self.adjust_depth(|_| 0);
        self.delegate.reset();
    }

    fn snapshot(&self) -> ContextSnapshot {
        self.delegate.snapshot()
    }
}
