//! Error types for the projection engine.
//!
//! Every failure is a precondition violation on the caller's inputs. Nothing
//! here is transient, so callers should report rather than retry.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProjectionError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// A period count, year span or age ordering is negative or zero where it
    /// must not be.
    #[error("invalid horizon: {message}")]
    InvalidHorizon { message: String },

    /// A rate is outside its domain (e.g. a non-positive withdrawal rate).
    #[error("invalid rate: {message}")]
    InvalidRate { message: String },

    /// Degenerate denominator in the payment formula.
    #[error("division by zero: {message}")]
    DivisionByZero { message: String },

    /// Non-finite or otherwise unusable input value.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl ProjectionError {
    pub(crate) fn horizon(message: impl Into<String>) -> Self {
        Self::InvalidHorizon {
            message: message.into(),
        }
    }

    pub(crate) fn rate(message: impl Into<String>) -> Self {
        Self::InvalidRate {
            message: message.into(),
        }
    }

    pub(crate) fn division(message: impl Into<String>) -> Self {
        Self::DivisionByZero {
            message: message.into(),
        }
    }

    pub(crate) fn input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

pub(crate) fn ensure_finite(value: f64, name: &str) -> Result<f64> {
    if !value.is_finite() {
        return Err(ProjectionError::input(format!(
            "{name} must be finite, got {value}"
        )));
    }
    Ok(value)
}

pub(crate) fn ensure_non_negative(value: f64, name: &str) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(ProjectionError::input(format!(
            "{name} must be non-negative and finite, got {value}"
        )));
    }
    Ok(value)
}
