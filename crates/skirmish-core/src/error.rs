//! Configuration errors.
//!
//! Raised when components are wired at spawn time. Runtime degenerate
//! cases (missing targets, zero time steps, unsolvable intercepts) never
//! produce errors.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `min` is greater than `max` for an output range.
    InvertedBounds {
        field: &'static str,
        min: f64,
        max: f64,
    },
    /// A value that must be zero or positive is negative.
    Negative { field: &'static str, value: f64 },
    /// A value that must be strictly positive is not.
    NonPositive { field: &'static str, value: f64 },
    /// A declared avoidance sensor has no probes on one side.
    EmptyProbeList { side: &'static str },
    /// A probe points nowhere.
    ZeroProbeDirection { probe: String },
    /// A ship has no engines to split thrust across.
    NoEngines,
    /// An attached ship part is wired inconsistently.
    InvalidPart { part: usize, reason: &'static str },
    /// A scenario file could not be read.
    Io { path: String, message: String },
    /// A scenario file is not valid JSON for the expected schema.
    Parse { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvertedBounds { field, min, max } => {
                write!(f, "{field}: min {min} is greater than max {max}")
            }
            Self::Negative { field, value } => write!(f, "{field} must not be negative, got {value}"),
            Self::NonPositive { field, value } => write!(f, "{field} must be positive, got {value}"),
            Self::EmptyProbeList { side } => write!(f, "avoidance sensor has no {side} probes"),
            Self::ZeroProbeDirection { probe } => {
                write!(f, "avoidance probe '{probe}' has a zero direction")
            }
            Self::NoEngines => write!(f, "ship must have at least one engine"),
            Self::InvalidPart { part, reason } => write!(f, "ship part {part}: {reason}"),
            Self::Io { path, message } => write!(f, "cannot read {path}: {message}"),
            Self::Parse { message } => write!(f, "invalid scenario: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Check that `value` is finite and strictly positive.
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// Check that `value` is zero or positive.
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}
