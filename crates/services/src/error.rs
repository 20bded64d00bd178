//! Shared error types for the services crate.

use thiserror::Error;

use course_core::model::{
    CourseError, CourseId, EnrollmentError, MaterialError, ProgressError, Role, UserError,
};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Coarse classification of backend failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Unauthorized,
    NotFound,
    Validation,
    Server,
}

/// Errors from a call to the REST backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("request rejected with status {status}: {message}")]
    Unauthorized { status: u16, message: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("backend returned status {status}: {message}")]
    Server { status: u16, message: String },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid payload: {0}")]
    Invalid(#[from] course_core::Error),
}

impl ApiError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Unauthorized { .. } => ErrorKind::Unauthorized,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::Decode(_) | ApiError::Invalid(_) => ErrorKind::Validation,
        }
    }

    /// Map a non-success HTTP status to an error.
    #[must_use]
    pub fn from_status(status: u16, path: &str, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| format!("{path} failed"));
        match status {
            401 | 403 => ApiError::Unauthorized { status, message },
            404 => ApiError::NotFound(path.to_owned()),
            _ => ApiError::Server { status, message },
        }
    }
}

/// Errors emitted by the session context.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Invalid(#[from] UserError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by course, learning and admin services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    #[error("sign in required")]
    NotSignedIn,
    #[error("this action requires the {required} role")]
    Forbidden { required: Role },
    #[error("not enrolled in course {0}")]
    NotEnrolled(CourseId),
    #[error(transparent)]
    Domain(#[from] course_core::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ServiceError {
    /// True when the failure means the session is no longer usable.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        match self {
            ServiceError::NotSignedIn => true,
            ServiceError::Api(err) => err.kind() == ErrorKind::Unauthorized,
            _ => false,
        }
    }
}

macro_rules! domain_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ServiceError {
                fn from(err: $ty) -> Self {
                    ServiceError::Domain(err.into())
                }
            }
        )*
    };
}

domain_error!(CourseError, EnrollmentError, MaterialError, ProgressError);

/// Errors raised while reading client configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid api url {value:?}: {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("invalid timeout {0:?}: expected a positive number of seconds")]
    InvalidTimeout(String),
    #[error(transparent)]
    Client(#[from] reqwest::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
