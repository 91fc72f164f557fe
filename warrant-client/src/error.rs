//! Client error type and its mapping onto the failure taxonomy.

use warrant_core::{LifecycleError, ServiceRejection, ValidationError, WarrantError};

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Envelope with a non-zero code. `message` is shown to the user as-is.
    #[error("{message}")]
    Service { code: i64, message: String },
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Where a failure came from, which decides how a caller reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network, timeout or server failure. Re-issuing the request may help.
    Transport,
    /// The response did not have the expected shape.
    Shape,
    /// The service refused the operation.
    Rejection,
    /// Refused locally before any request was sent.
    Local,
}

impl ApiClientError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiClientError::Http(err) if err.is_decode() => ErrorCategory::Shape,
            ApiClientError::Http(_) => ErrorCategory::Transport,
            ApiClientError::Status { status, .. } if *status >= 500 => ErrorCategory::Transport,
            ApiClientError::Status { .. } | ApiClientError::Service { .. } => ErrorCategory::Rejection,
            ApiClientError::Serde(_) | ApiClientError::InvalidResponse(_) => ErrorCategory::Shape,
            ApiClientError::Config(_)
            | ApiClientError::Validation(_)
            | ApiClientError::Lifecycle(_) => ErrorCategory::Local,
        }
    }

    /// Text for the operator. Service messages pass through untouched.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<ServiceRejection> for ApiClientError {
    fn from(rejection: ServiceRejection) -> Self {
        ApiClientError::Service {
            code: rejection.code,
            message: rejection.message,
        }
    }
}

impl From<WarrantError> for ApiClientError {
    fn from(err: WarrantError) -> Self {
        match err {
            WarrantError::Validation(err) => ApiClientError::Validation(err),
            WarrantError::Lifecycle(err) => ApiClientError::Lifecycle(err),
        }
    }
}

pub type ClientResult<T> = Result<T, ApiClientError>;
