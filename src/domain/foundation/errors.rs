//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be at least {min} characters, got {actual}")]
    TooShort {
        field: String,
        min: usize,
        actual: usize,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates a too-short validation error.
    pub fn too_short(field: impl Into<String>, min: usize, actual: usize) -> Self {
        ValidationError::TooShort {
            field: field.into(),
            min,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // Not found errors
    JournalNotFound,
    ImageNotFound,

    // Conflict errors
    JournalAlreadyExists,
    InvalidStateTransition,
    PhaseClosed,

    // Capacity errors
    TurnCapReached,

    // AI errors
    AIServiceUnavailable,

    // Infrastructure errors
    DatabaseError,
    StorageError,
}

/// Coarse error taxonomy exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    NotFound,
    Conflict,
    Capacity,
    ServiceUnavailable,
    Validation,
    Internal,
}

impl ErrorCode {
    /// Maps the code onto the caller-facing taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorCode::ValidationFailed => ErrorCategory::Validation,
            ErrorCode::JournalNotFound | ErrorCode::ImageNotFound => ErrorCategory::NotFound,
            ErrorCode::JournalAlreadyExists
            | ErrorCode::InvalidStateTransition
            | ErrorCode::PhaseClosed => ErrorCategory::Conflict,
            ErrorCode::TurnCapReached => ErrorCategory::Capacity,
            ErrorCode::AIServiceUnavailable => ErrorCategory::ServiceUnavailable,
            ErrorCode::DatabaseError | ErrorCode::StorageError => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::JournalNotFound => "JOURNAL_NOT_FOUND",
            ErrorCode::ImageNotFound => "IMAGE_NOT_FOUND",
            ErrorCode::JournalAlreadyExists => "JOURNAL_ALREADY_EXISTS",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::PhaseClosed => "PHASE_CLOSED",
            ErrorCode::TurnCapReached => "TURN_CAP_REACHED",
            ErrorCode::AIServiceUnavailable => "AI_SERVICE_UNAVAILABLE",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::StorageError => "STORAGE_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field.into())
    }

    /// Creates a database error from any displayable cause.
    pub fn database(context: &str, cause: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, format!("{}: {}", context, cause))
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Returns the caller-facing category of this error.
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::EmptyField { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field.clone(),
        };
        DomainError::validation(field, err.to_string())
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_too_short_displays_correctly() {
        let err = ValidationError::too_short("text", 10, 3);
        assert_eq!(
            err.to_string(),
            "Field 'text' must be at least 10 characters, got 3"
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::TurnCapReached, "Turn limit reached");
        assert_eq!(err.to_string(), "[TURN_CAP_REACHED] Turn limit reached");
    }

    #[test]
    fn codes_map_onto_caller_taxonomy() {
        assert_eq!(ErrorCode::JournalNotFound.category(), ErrorCategory::NotFound);
        assert_eq!(ErrorCode::JournalAlreadyExists.category(), ErrorCategory::Conflict);
        assert_eq!(ErrorCode::TurnCapReached.category(), ErrorCategory::Capacity);
        assert_eq!(
            ErrorCode::AIServiceUnavailable.category(),
            ErrorCategory::ServiceUnavailable
        );
        assert_eq!(ErrorCode::ValidationFailed.category(), ErrorCategory::Validation);
        assert_eq!(ErrorCode::ImageNotFound.category(), ErrorCategory::NotFound);
        assert_eq!(ErrorCode::PhaseClosed.category(), ErrorCategory::Conflict);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::Internal);
        assert_eq!(ErrorCode::StorageError.category(), ErrorCategory::Internal);
    }

    #[test]
    fn validation_error_converts_with_field_detail() {
        let err: DomainError = ValidationError::empty_field("message").into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.get("field"), Some(&"message".to_string()));
    }
}
