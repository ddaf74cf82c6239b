//! Shared validation utilities
//!
//! ```rust,ignore
//! use playdeck_server::features::shared::validation::{validate_name, validate_count};
//!
//! let name = validate_name("name", &form.name, 128)?;
//! validate_count("categories", categories.len(), 2, 20)?;
//! ```

use thiserror::Error;

/// Errors raised by the field validators below
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldValidationError {
    #[error("{field} is required and cannot be empty")]
    Required { field: String },

    #[error("{field} must be at most {max_length} characters")]
    TooLong { field: String, max_length: usize },

    #[error("{field} must contain between {min} and {max} entries, got {actual}")]
    Count {
        field: String,
        min: usize,
        max: usize,
        actual: usize,
    },
}

/// Trim and check a required name.
///
/// Length is counted in characters, not bytes.
pub fn validate_name(
    field: &str,
    value: &str,
    max_length: usize,
) -> Result<String, FieldValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldValidationError::Required {
            field: field.to_string(),
        });
    }
    if trimmed.chars().count() > max_length {
        return Err(FieldValidationError::TooLong {
            field: field.to_string(),
            max_length,
        });
    }
    Ok(trimmed.to_string())
}

/// Length check for free text that may be empty.
pub fn validate_max_length(
    field: &str,
    value: &str,
    max_length: usize,
) -> Result<(), FieldValidationError> {
    if value.chars().count() > max_length {
        return Err(FieldValidationError::TooLong {
            field: field.to_string(),
            max_length,
        });
    }
    Ok(())
}

pub fn validate_count(
    field: &str,
    actual: usize,
    min: usize,
    max: usize,
) -> Result<(), FieldValidationError> {
    if actual < min || actual > max {
        return Err(FieldValidationError::Count {
            field: field.to_string(),
            min,
            max,
            actual,
        });
    }
    Ok(())
}
