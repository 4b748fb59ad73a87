//! Range checks shared by instrument configs and scores.
//!
//! Checks collect every problem instead of stopping at the first, so a
//! hand-edited file reports all of its mistakes in one run.

use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A numeric field outside its allowed range.
    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted path of the field, e.g. `events[3].note`.
        field: String,
        /// The offending value.
        value: i64,
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
    },

    /// A pot name that is not on the panel.
    #[error("unknown pot '{0}'")]
    UnknownPot(String),

    /// Rates that do not give a whole number of audio ticks per control tick.
    #[error("audio rate {audio_rate} Hz is not a multiple of control rate {control_rate} Hz")]
    RateMismatch {
        /// Audio tick rate.
        audio_rate: u32,
        /// Control tick rate.
        control_rate: u32,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Accumulates validation failures.
#[derive(Debug, Default)]
pub(crate) struct Checker {
    errors: Vec<ValidationError>,
}

impl Checker {
    /// Record an error if `value` is outside `min..=max`.
    pub(crate) fn range(&mut self, field: impl FnOnce() -> String, value: i64, min: i64, max: i64) {
        if value < min || value > max {
            self.errors.push(ValidationError::OutOfRange {
                field: field(),
                value,
                min,
                max,
            });
        }
    }

    /// Record an arbitrary error.
    pub(crate) fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// `Ok` if nothing was recorded, the single error, or all of them.
    pub(crate) fn finish(mut self) -> ValidationResult<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(ValidationError::Multiple(self.errors)),
        }
    }
}
