//! Error types for locally checked request shapes.

use thiserror::Error;

/// Validation errors raised before a request leaves the client.
///
/// These cover shape problems only. Whether a field name exists, whether a
/// tuple is already stored, and similar questions are answered by the remote
/// service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Filter tree exceeds maximum depth of {max}")]
    FilterTooDeep { max: usize },

    #[error("Malformed policy tuple {tuple:?}: {reason}")]
    MalformedTuple { tuple: Vec<String>, reason: String },

    #[error("Duplicate tuple in batch: {tuple:?}")]
    DuplicateInBatch { tuple: Vec<String> },

    #[error("Empty batch for {operation}")]
    EmptyBatch { operation: &'static str },
}

impl ValidationError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Abstract-group lifecycle errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Invalid transition from {from:?} on {event:?}")]
    InvalidTransition {
        from: crate::group::GroupState,
        event: crate::group::GroupEvent,
    },

    #[error("Abstract group has no server id yet")]
    NotCreated,
}

/// Result type for local validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Any error raised by this crate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WarrantError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}
