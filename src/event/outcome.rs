use serde::Serialize;
use std::fmt;

/// Description of an error raised by the traced program.
///
/// The traced program keeps its real error value and propagates it
/// unchanged; the trace only records what is needed to render it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CapturedError {
    type_name: String,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    causes: Vec<String>,
}

impl CapturedError {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            causes: Vec::new(),
        }
    }

    /// Capture an error by reference, walking its `source()` chain.
    ///
    /// The type name is the short name of `E`; for trait objects it
    /// degrades to the trait's name.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        Self {
            type_name: short_type_name(std::any::type_name::<E>()).to_string(),
            message: error.to_string(),
            causes,
        }
    }

    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::new("panic", message)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Messages of the `source()` chain, outermost first.
    pub fn causes(&self) -> &[String] {
        &self.causes
    }
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)
    }
}

/// `core::num::ParseIntError` -> `ParseIntError`, `Foo<Bar>` -> `Foo`,
/// `dyn core::error::Error + Send` -> `Error`.
fn short_type_name(full: &str) -> &str {
    let first_bound = full
        .trim_start_matches("dyn ")
        .split(" + ")
        .next()
        .unwrap_or(full);
    let without_generics = first_bound.split('<').next().unwrap_or(first_bound);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}

/// How a traced call completed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceOutcome {
    /// Normal completion; `None` for calls without a value.
    Returned { rendered_value: Option<String> },
    /// Completion through an error. When `error_context_in_signature` is
    /// set, the node's signature already carries the resolved error context
    /// and renderers need not look elsewhere for it.
    Threw {
        error: CapturedError,
        error_context_in_signature: bool,
    },
}

impl TraceOutcome {
    pub fn returned(rendered_value: Option<String>) -> Self {
        TraceOutcome::Returned { rendered_value }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TraceOutcome::Threw { .. })
    }

    pub fn rendered_value(&self) -> Option<&str> {
        match self {
            TraceOutcome::Returned { rendered_value } => rendered_value.as_deref(),
            TraceOutcome::Threw { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&CapturedError> {
        match self {
            TraceOutcome::Returned { .. } => None,
            TraceOutcome::Threw { error, .. } => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Outer(std::num::ParseIntError);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "could not read quantity")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_from_error_uses_short_type_name_and_source_chain() {
        let inner = "x".parse::<u32>().unwrap_err();
        let captured = CapturedError::from_error(&Outer(inner));

        assert_eq!(captured.type_name(), "Outer");
        assert_eq!(captured.message(), "could not read quantity");
        assert_eq!(captured.causes().len(), 1);
        assert_eq!(captured.to_string(), "Outer: could not read quantity");
    }

    #[test]
    fn test_short_type_name_strips_paths_and_generics() {
        assert_eq!(short_type_name("core::num::ParseIntError"), "ParseIntError");
        assert_eq!(short_type_name("my::Wrapper<alloc::string::String>"), "Wrapper");
        assert_eq!(short_type_name("dyn core::error::Error"), "Error");
        assert_eq!(
            short_type_name("dyn core::error::Error + core::marker::Send + core::marker::Sync"),
            "Error"
        );
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn test_from_panic_reads_str_and_string_payloads() {
        let str_payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(CapturedError::from_panic(str_payload.as_ref()).message(), "boom");

        let string_payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        let captured = CapturedError::from_panic(string_payload.as_ref());
        assert_eq!(captured.type_name(), "panic");
        assert_eq!(captured.message(), "bang");
    }

    #[test]
    fn test_outcome_accessors() {
        let returned = TraceOutcome::returned(Some("42".into()));
        assert_eq!(returned.rendered_value(), Some("42"));
        assert!(!returned.is_error());

        let threw = TraceOutcome::Threw {
            error: CapturedError::new("IoError", "disk full"),
            error_context_in_signature: false,
        };
        assert!(threw.is_error());
        assert_eq!(threw.error().map(CapturedError::message), Some("disk full"));
        assert_eq!(threw.rendered_value(), None);
    }
}
