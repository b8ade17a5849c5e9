//! Configuration errors and validation traits.

use thiserror::Error;

/// Errors raised while validating configuration values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A numeric value fell outside its allowed range.
    #[error("'{field}' must be in {range}, got {value}")]
    OutOfRange {
        /// Field name.
        field: String,
        /// Human readable description of the allowed range.
        range: String,
        /// The rejected value.
        value: String,
    },

    /// A sequence had the wrong number of elements.
    #[error("'{field}' must have exactly {expected} elements, got {actual}")]
    InvalidLength {
        /// Field name.
        field: String,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Any other invalid configuration.
    #[error("{0}")]
    Invalid(String),
}

/// Trait implemented by configuration structs that can check their own values.
pub trait ConfigValidator {
    /// Validates the configuration, returning the first problem found.
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Helper checks shared by [`ConfigValidator`] implementations.
pub trait ConfigValidatorExt: ConfigValidator {
    /// Checks that `value` lies in the half-open interval `(min, max]`.
    fn validate_left_open_range(
        field: &str,
        value: f32,
        min: f32,
        max: f32,
    ) -> Result<(), ConfigError> {
        if value.is_finite() && value > min && value <= max {
            Ok(())
        } else {
            Err(ConfigError::OutOfRange {
                field: field.to_string(),
                range: format!("({min}, {max}]"),
                value: value.to_string(),
            })
        }
    }

    /// Checks that a count or size is strictly positive.
    fn validate_positive_usize(field: &str, value: usize) -> Result<(), ConfigError> {
        if value > 0 {
            Ok(())
        } else {
            Err(ConfigError::OutOfRange {
                field: field.to_string(),
                range: "(0, inf)".to_string(),
                value: value.to_string(),
            })
        }
    }

    /// Checks that a per-channel sequence has the expected length.
    fn validate_len(field: &str, values: &[f32], expected: usize) -> Result<(), ConfigError> {
        if values.len() == expected {
            Ok(())
        } else {
            Err(ConfigError::InvalidLength {
                field: field.to_string(),
                expected,
                actual: values.len(),
            })
        }
    }
}

impl<T: ConfigValidator> ConfigValidatorExt for T {}
