//! Errors produced by the reference fields and validators.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a field or validator rejected its input.
///
/// Fields and validators are generic over any error type that can be built
/// from a `FieldError`, so hosts can wrap these in their own error enum.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum FieldError {
    #[error("A value is required")]
    Required,

    #[error("'{input}' is not a valid {expected}")]
    Unparseable { input: String, expected: String },

    #[error("'{key}' is not one of the available choices")]
    InvalidChoice { key: String },

    #[error("'{input}' does not match the expected format")]
    PatternMismatch { input: String },

    #[error("Must be at least {min} characters")]
    TooShort { min: usize },

    #[error("Must be at most {max} characters")]
    TooLong { max: usize },

    #[error("Must be between {min} and {max}")]
    OutOfRange { min: String, max: String },

    #[error("{message}")]
    Custom { message: String },
}

impl FieldError {
    pub fn custom(message: impl Into<String>) -> Self {
        FieldError::Custom {
            message: message.into(),
        }
    }
}

impl From<FieldError> for String {
    fn from(error: FieldError) -> Self {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = FieldError::Unparseable {
            input: "abc".to_string(),
            expected: "integer".to_string(),
        };
        assert_eq!(err.to_string(), "'abc' is not a valid integer");
        assert_eq!(String::from(FieldError::Required), "A value is required");
    }

    #[test]
    fn test_serializes_with_code() {
        let json = serde_json::to_value(FieldError::TooShort { min: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({ "code": "too_short", "min": 3 }));
    }
}
