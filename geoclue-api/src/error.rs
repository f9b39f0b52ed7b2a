use std::time::Duration;
use thiserror::Error;

/// Errors raised while talking to the location service over the bus
///
/// Every variant names the remote method involved (where there is one) so a
/// caller can tell which step of a multi-call operation failed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    /// Could not reach the bus or build the runtime that drives it
    #[error("Bus connection error: {0}")]
    Connection(String),

    /// The remote method returned an error or could not be delivered
    #[error("{method} failed: {message}")]
    Call {
        method: &'static str,
        message: String,
    },

    /// The remote method did not answer within the configured bound
    #[error("{method} timed out after {after:?}")]
    Timeout {
        method: &'static str,
        after: Duration,
    },

    /// The reply arrived but did not contain what the interface promises
    #[error("Invalid reply from {method}: {message}")]
    InvalidReply {
        method: &'static str,
        message: String,
    },

    /// A bus name or object path is malformed
    #[error("Invalid bus name or path: {0}")]
    InvalidName(String),
}

impl ApiError {
    /// Wrap a failed remote call
    pub fn call(method: &'static str, error: impl std::fmt::Display) -> Self {
        Self::Call {
            method,
            message: error.to_string(),
        }
    }

    /// Remote method the error refers to, if any
    pub fn method(&self) -> Option<&'static str> {
        match self {
            ApiError::Call { method, .. }
            | ApiError::Timeout { method, .. }
            | ApiError::InvalidReply { method, .. } => Some(method),
            ApiError::Connection(_) | ApiError::InvalidName(_) => None,
        }
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;
