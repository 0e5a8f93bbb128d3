//! Raw failures, before normalization

use serde_json::Value;
use thiserror::Error;

use super::standard::StandardError;

/// Codes a transport attaches to a no-response failure caused by a deadline
pub const TIMEOUT_CODES: [&str; 2] = ["ECONNABORTED", "ETIMEDOUT"];

/// Message a transport reports for a generic connectivity failure
pub const NETWORK_ERROR_MESSAGE: &str = "Network Error";

/// A failure raised by the transport collaborator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportFailure {
    /// The call failed before any response was received
    #[error("no response: {message}")]
    NoResponse {
        code: Option<String>,
        message: String,
    },

    /// A response arrived with a non-success HTTP status
    #[error("HTTP {status}")]
    Status { status: u16, body: Option<Value> },
}

impl TransportFailure {
    /// Deadline exceeded
    pub fn timed_out() -> Self {
        Self::NoResponse {
            code: Some("ETIMEDOUT".to_string()),
            message: "timeout exceeded".to_string(),
        }
    }

    /// Call aborted by the client
    pub fn aborted() -> Self {
        Self::NoResponse {
            code: Some("ECONNABORTED".to_string()),
            message: "request aborted".to_string(),
        }
    }

    /// Generic connectivity failure
    pub fn network(code: Option<&str>, message: impl Into<String>) -> Self {
        Self::NoResponse {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// Non-success HTTP status with an optional JSON body
    pub fn status(status: u16, body: Option<Value>) -> Self {
        Self::Status { status, body }
    }

    /// Whether no response was received because of a deadline
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::NoResponse { code: Some(code), .. } => TIMEOUT_CODES.contains(&code.as_str()),
            _ => false,
        }
    }

    /// HTTP status, when a response was received
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::NoResponse { .. } => None,
        }
    }
}

/// Anything an operation can fail with, prior to normalization
#[derive(Debug, Error)]
pub enum Failure {
    /// Transport-level failure, with or without an HTTP status
    #[error(transparent)]
    Transport(#[from] TransportFailure),

    /// An arbitrary JSON value, usually an envelope with `success: false`
    #[error("unexpected payload: {0}")]
    Value(Value),

    /// A native error with no network metadata
    #[error("{0}")]
    Native(Box<dyn std::error::Error + Send + Sync>),

    /// A plain message
    #[error("{0}")]
    Message(String),

    /// An already-normalized error
    #[error(transparent)]
    Standard(#[from] StandardError),
}

impl Failure {
    /// Wrap any native error
    pub fn native(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Native(Box::new(err))
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl From<Value> for Failure {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Self::native(err)
    }
}

impl From<std::io::Error> for Failure {
    fn from(err: std::io::Error) -> Self {
        Self::native(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_detection() {
        assert!(TransportFailure::timed_out().is_timeout());
        assert!(TransportFailure::aborted().is_timeout());
        assert!(!TransportFailure::network(None, NETWORK_ERROR_MESSAGE).is_timeout());
        assert!(!TransportFailure::status(504, None).is_timeout());
    }

    #[test]
    fn test_http_status() {
        assert_eq!(TransportFailure::status(404, None).http_status(), Some(404));
        assert_eq!(TransportFailure::timed_out().http_status(), None);
    }
}
