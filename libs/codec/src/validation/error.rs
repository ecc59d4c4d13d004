use std::fmt::Display;
use thiserror::Error;
use vessel_types::{ContainerError, ErrorCode, ValueKind};

/// Component name attached to validation failures surfaced as [`ContainerError`]
pub const SCHEMA_COMPONENT: &str = "schema";

/// One violated field constraint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} [{}]", code.code())]
pub struct ValidationError {
    /// Field name; nested failures use `parent.child`
    pub field: String,
    /// One of the 310-317 validation codes
    pub code: ErrorCode,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, code: ErrorCode, message: String) -> Self {
        Self {
            field: field.to_string(),
            code,
            message,
        }
    }

    pub fn missing_required(field: &str) -> Self {
        Self::new(
            field,
            ErrorCode::MissingRequired,
            format!("required field '{field}' is missing"),
        )
    }

    pub fn type_mismatch(field: &str, expected: ValueKind, actual: ValueKind) -> Self {
        Self::new(
            field,
            ErrorCode::FieldTypeMismatch,
            format!("field '{field}' type mismatch: expected {expected}, got {actual}"),
        )
    }

    pub fn out_of_range<T: Display>(field: &str, value: T, min: T, max: T) -> Self {
        Self::new(
            field,
            ErrorCode::OutOfRange,
            format!("field '{field}' value {value} is out of range [{min}, {max}]"),
        )
    }

    pub fn invalid_length(field: &str, len: usize, min: usize, max: usize) -> Self {
        Self::new(
            field,
            ErrorCode::InvalidLength,
            format!("field '{field}' length {len} is outside bounds [{min}, {max}]"),
        )
    }

    pub fn pattern_mismatch(field: &str, pattern: &str) -> Self {
        Self::new(
            field,
            ErrorCode::PatternMismatch,
            format!("field '{field}' does not match pattern '{pattern}'"),
        )
    }

    pub fn not_allowed(field: &str, value: &str) -> Self {
        Self::new(
            field,
            ErrorCode::NotInAllowedValues,
            format!("field '{field}' value '{value}' is not in allowed values"),
        )
    }

    pub fn custom_failed(field: &str, reason: &str) -> Self {
        Self::new(
            field,
            ErrorCode::CustomValidationFailed,
            format!("field '{field}' custom validation failed: {reason}"),
        )
    }

    pub fn nested_failed(field: &str, count: usize) -> Self {
        Self::new(
            field,
            ErrorCode::NestedValidationFailed,
            format!("field '{field}' nested validation failed with {count} error(s)"),
        )
    }

    /// Re-tag a child error under its enclosing field
    pub(crate) fn under(mut self, parent: &str) -> Self {
        self.field = format!("{parent}.{}", self.field);
        self
    }
}

impl From<ValidationError> for ContainerError {
    fn from(err: ValidationError) -> Self {
        ContainerError::new(err.code, SCHEMA_COMPONENT).with_detail(err.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_and_codes() {
        let err = ValidationError::out_of_range("age", 200, 0, 150);
        assert_eq!(err.code, ErrorCode::OutOfRange);
        assert_eq!(err.to_string(), "field 'age' value 200 is out of range [0, 150] [312]");

        let nested = ValidationError::missing_required("street").under("address");
        assert_eq!(nested.field, "address.street");
        assert_eq!(nested.code.code(), 310);
    }

    #[test]
    fn test_conversion_to_container_error() {
        let err: ContainerError = ValidationError::not_allowed("role", "root").into();
        assert_eq!(err.code, ErrorCode::NotInAllowedValues);
        assert_eq!(err.component, "schema");
        assert!(err.detail.unwrap().contains("root"));
    }
}
