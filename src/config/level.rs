//! Capture policy levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// How much detail the call-tree builder keeps, from least to most.
///
/// Levels are ordered: a higher level enables everything the lower levels
/// enable.
///
/// | Level       | Keeps                                   |
/// |-------------|-----------------------------------------|
/// | `Off`       | nothing                                 |
/// | `Errors`    | call paths that end in an error         |
/// | `Summary`   | the outermost call and leaf calls       |
/// | `Narrative` | every call, parameter values blanked    |
/// | `Detail`    | every call with full parameter values   |
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum TracingLevel {
    Off = 0,
    Errors = 1,
    Summary = 2,
    Narrative = 3,
    #[default]
    Detail = 4,
}

impl TracingLevel {
    /// All levels in ascending order of detail.
    pub const ALL: [TracingLevel; 5] = [
        TracingLevel::Off,
        TracingLevel::Errors,
        TracingLevel::Summary,
        TracingLevel::Narrative,
        TracingLevel::Detail,
    ];

    /// Whether this level is at least as detailed as `required`.
    #[inline]
    pub fn is_enabled(self, required: TracingLevel) -> bool {
        self >= required
    }

    /// True for every level except `Off`.
    #[inline]
    pub fn is_active(self) -> bool {
        self.is_enabled(TracingLevel::Errors)
    }

    /// Parameter values are only kept at `Detail`.
    #[inline]
    pub fn keeps_parameter_values(self) -> bool {
        self.is_enabled(TracingLevel::Detail)
    }

    #[inline]
    pub(crate) fn as_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`as_u8`](Self::as_u8); out-of-range values clamp to `Detail`.
    #[inline]
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => TracingLevel::Off,
            1 => TracingLevel::Errors,
            2 => TracingLevel::Summary,
            3 => TracingLevel::Narrative,
            _ => TracingLevel::Detail,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TracingLevel::Off => "off",
            TracingLevel::Errors => "errors",
            TracingLevel::Summary => "summary",
            TracingLevel::Narrative => "narrative",
            TracingLevel::Detail => "detail",
        }
    }
}

impl fmt::Display for TracingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TracingLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        TracingLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::InvalidLevel(trimmed.to_string()))
    }
}
