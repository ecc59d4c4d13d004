//! Error codes and the container error type
//!
//! Codes are grouped into bands by their hundreds digit. The numeric values
//! are part of the external interface and are stable across releases:
//!
//! ```text
//! 1xx  value operations    key_not_found, type_mismatch, empty_key, ...
//! 2xx  serialization       serialization_failed, corrupted_data, ...
//! 3xx  validation          schema_validation_failed, 310-317 field violations
//! 4xx  resources           memory_allocation_failed, io_error, ...
//! 5xx  thread safety       lock_acquisition_failed, lock_timeout
//! ```

use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::collections::TryReserveError;
use std::fmt;
use thiserror::Error;

/// Stable numeric error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u16)]
pub enum ErrorCode {
    // Value operations
    KeyNotFound = 100,
    TypeMismatch = 101,
    ValueOutOfRange = 102,
    InvalidValue = 103,
    KeyAlreadyExists = 104,
    EmptyKey = 105,

    // Serialization
    SerializationFailed = 200,
    DeserializationFailed = 201,
    InvalidFormat = 202,
    VersionMismatch = 203,
    CorruptedData = 204,
    HeaderParseFailed = 205,
    ValueParseFailed = 206,
    EncodingError = 207,

    // Validation
    SchemaValidationFailed = 300,
    MissingRequiredField = 301,
    ConstraintViolated = 302,
    TypeConstraintViolated = 303,
    MaxSizeExceeded = 304,

    // Field-level validation violations
    MissingRequired = 310,
    FieldTypeMismatch = 311,
    OutOfRange = 312,
    InvalidLength = 313,
    PatternMismatch = 314,
    NotInAllowedValues = 315,
    CustomValidationFailed = 316,
    NestedValidationFailed = 317,

    // Resources
    MemoryAllocationFailed = 400,
    FileNotFound = 401,
    FileReadError = 402,
    FileWriteError = 403,
    PermissionDenied = 404,
    ResourceExhausted = 405,
    IoError = 406,

    // Thread safety
    LockAcquisitionFailed = 500,
    ConcurrentModification = 501,
    LockTimeout = 502,
}

/// Band an [`ErrorCode`] belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    ValueOperation,
    Serialization,
    Validation,
    Resource,
    ThreadSafety,
}

impl ErrorCategory {
    pub fn name(self) -> &'static str {
        match self {
            ErrorCategory::ValueOperation => "value_operation",
            ErrorCategory::Serialization => "serialization",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Resource => "resource",
            ErrorCategory::ThreadSafety => "thread_safety",
        }
    }
}

impl ErrorCode {
    /// Numeric value of the code
    #[inline]
    pub fn code(self) -> u16 {
        self.into()
    }

    /// Static human-readable message
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::KeyNotFound => "Key not found",
            ErrorCode::TypeMismatch => "Type mismatch",
            ErrorCode::ValueOutOfRange => "Value out of range",
            ErrorCode::InvalidValue => "Invalid value",
            ErrorCode::KeyAlreadyExists => "Key already exists",
            ErrorCode::EmptyKey => "Empty key",

            ErrorCode::SerializationFailed => "Serialization failed",
            ErrorCode::DeserializationFailed => "Deserialization failed",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::VersionMismatch => "Version mismatch",
            ErrorCode::CorruptedData => "Corrupted data",
            ErrorCode::HeaderParseFailed => "Header parse failed",
            ErrorCode::ValueParseFailed => "Value parse failed",
            ErrorCode::EncodingError => "Encoding error",

            ErrorCode::SchemaValidationFailed => "Schema validation failed",
            ErrorCode::MissingRequiredField => "Missing required field",
            ErrorCode::ConstraintViolated => "Constraint violated",
            ErrorCode::TypeConstraintViolated => "Type constraint violated",
            ErrorCode::MaxSizeExceeded => "Maximum size exceeded",

            ErrorCode::MissingRequired => "Required field is missing",
            ErrorCode::FieldTypeMismatch => "Field type mismatch",
            ErrorCode::OutOfRange => "Value is out of range",
            ErrorCode::InvalidLength => "Invalid length",
            ErrorCode::PatternMismatch => "Pattern mismatch",
            ErrorCode::NotInAllowedValues => "Value not in allowed list",
            ErrorCode::CustomValidationFailed => "Custom validation failed",
            ErrorCode::NestedValidationFailed => "Nested schema validation failed",

            ErrorCode::MemoryAllocationFailed => "Memory allocation failed",
            ErrorCode::FileNotFound => "File not found",
            ErrorCode::FileReadError => "File read error",
            ErrorCode::FileWriteError => "File write error",
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::ResourceExhausted => "Resource exhausted",
            ErrorCode::IoError => "I/O error",

            ErrorCode::LockAcquisitionFailed => "Lock acquisition failed",
            ErrorCode::ConcurrentModification => "Concurrent modification",
            ErrorCode::LockTimeout => "Lock timeout",
        }
    }

    /// Band derived from the hundreds digit
    pub fn category(self) -> ErrorCategory {
        match self.code() / 100 {
            1 => ErrorCategory::ValueOperation,
            2 => ErrorCategory::Serialization,
            3 => ErrorCategory::Validation,
            4 => ErrorCategory::Resource,
            _ => ErrorCategory::ThreadSafety,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.message(), self.code())
    }
}

/// Typed failure carrying {code, message, originating component}
///
/// Every fallible public operation in the workspace returns this type; no
/// operation panics across its public boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{component}: {code}{}", detail_suffix(.detail))]
pub struct ContainerError {
    pub code: ErrorCode,
    pub component: &'static str,
    pub detail: Option<String>,
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default()
}

/// Component name used by the container and storage layers
pub const CONTAINER_COMPONENT: &str = "container";

impl ContainerError {
    pub fn new(code: ErrorCode, component: &'static str) -> Self {
        Self {
            code,
            component,
            detail: None,
        }
    }

    /// Attach a free-text detail suffix
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Static message of the underlying code
    pub fn message(&self) -> &'static str {
        self.code.message()
    }

    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    pub fn key_not_found(key: &str) -> Self {
        Self::new(ErrorCode::KeyNotFound, CONTAINER_COMPONENT).with_detail(key)
    }

    pub fn type_mismatch(key: &str, expected: impl fmt::Display, actual: impl fmt::Display) -> Self {
        Self::new(ErrorCode::TypeMismatch, CONTAINER_COMPONENT)
            .with_detail(format!("{key}: expected {expected}, found {actual}"))
    }

    pub fn empty_key() -> Self {
        Self::new(ErrorCode::EmptyKey, CONTAINER_COMPONENT)
    }

    /// Allocation failure reported by `try_reserve`
    pub fn allocation(component: &'static str, err: TryReserveError) -> Self {
        Self::new(ErrorCode::MemoryAllocationFailed, component).with_detail(err.to_string())
    }
}

/// Result type for container and storage operations
pub type Result<T> = std::result::Result<T, ContainerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values_are_stable() {
        assert_eq!(ErrorCode::KeyNotFound.code(), 100);
        assert_eq!(ErrorCode::EmptyKey.code(), 105);
        assert_eq!(ErrorCode::EncodingError.code(), 207);
        assert_eq!(ErrorCode::MaxSizeExceeded.code(), 304);
        assert_eq!(ErrorCode::OutOfRange.code(), 312);
        assert_eq!(ErrorCode::IoError.code(), 406);
        assert_eq!(ErrorCode::LockTimeout.code(), 502);
        assert_eq!(ErrorCode::try_from(312u16).unwrap(), ErrorCode::OutOfRange);
        assert!(ErrorCode::try_from(999u16).is_err());
    }

    #[test]
    fn test_categories() {
        assert_eq!(ErrorCode::TypeMismatch.category(), ErrorCategory::ValueOperation);
        assert_eq!(ErrorCode::CorruptedData.category(), ErrorCategory::Serialization);
        assert_eq!(ErrorCode::PatternMismatch.category(), ErrorCategory::Validation);
        assert_eq!(ErrorCode::MemoryAllocationFailed.category(), ErrorCategory::Resource);
        assert_eq!(ErrorCode::ConcurrentModification.category(), ErrorCategory::ThreadSafety);
        assert_eq!(ErrorCategory::Resource.name(), "resource");
    }

    #[test]
    fn test_display_includes_component_and_detail() {
        let err = ContainerError::key_not_found("age");
        assert_eq!(err.to_string(), "container: Key not found [100]: age");

        let bare = ContainerError::new(ErrorCode::LockTimeout, "pool");
        assert_eq!(bare.to_string(), "pool: Lock timeout [502]");
        assert_eq!(bare.message(), "Lock timeout");
    }
}
