//! Validation helpers shared by the configuration builders
//!
//! Builders collect fields as `Option`s, report the first missing one as
//! [`ValidationError::MissingField`] and then run the numeric checks below.
//! Every [`ValidationError`] converts into [`SimError::Configuration`].

use qsim_core::SimError;

/// Validation result for builder configuration
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Errors that can occur during builder validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field '{field}'")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Field '{field}' must be {constraint}")]
    ConstraintViolation { field: String, constraint: String },
}

impl From<ValidationError> for SimError {
    fn from(err: ValidationError) -> Self {
        SimError::Configuration(err.to_string())
    }
}

/// Unwrap a required builder field
pub fn require<T>(field: &str, value: Option<T>) -> ValidationResult<T> {
    value.ok_or_else(|| ValidationError::MissingField {
        field: field.to_string(),
    })
}

/// Helper for validating numeric ranges
pub fn validate_range<T: PartialOrd + std::fmt::Display>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> ValidationResult<()> {
    if value < min || value > max {
        Err(ValidationError::ConstraintViolation {
            field: field.to_string(),
            constraint: format!("between {min} and {max}"),
        })
    } else {
        Ok(())
    }
}

/// Helper for validating that a value is positive
///
/// `NaN` is rejected as well: it fails every comparison.
pub fn validate_positive<T: PartialOrd + Default + std::fmt::Display>(
    field: &str,
    value: T,
) -> ValidationResult<()> {
    if value > T::default() {
        Ok(())
    } else {
        Err(ValidationError::ConstraintViolation {
            field: field.to_string(),
            constraint: "positive".to_string(),
        })
    }
}

/// Helper for validating that a float is neither infinite nor `NaN`
pub fn validate_finite(field: &str, value: f64) -> ValidationResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("{value} is not a finite number"),
        })
    }
}
