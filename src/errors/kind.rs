//! Error taxonomy

use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of failure kinds every error is normalized into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// No response received, connection failed
    #[serde(rename = "NETWORK_ERROR")]
    Network,
    /// No response received within the deadline
    #[serde(rename = "TIMEOUT_ERROR")]
    Timeout,
    /// Request rejected as malformed (locally or by HTTP 400/422)
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    /// Deterministic rejection by the backend's domain logic
    #[serde(rename = "BUSINESS_ERROR")]
    Business,
    /// HTTP 500/502/503/504
    #[serde(rename = "SERVER_ERROR")]
    Server,
    /// Everything else
    #[serde(rename = "UNKNOWN_ERROR")]
    Unknown,
}

impl ErrorKind {
    /// All kinds, in declaration order
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::Network,
        ErrorKind::Timeout,
        ErrorKind::Validation,
        ErrorKind::Business,
        ErrorKind::Server,
        ErrorKind::Unknown,
    ];

    /// Returns the string code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::Timeout => "TIMEOUT_ERROR",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Business => "BUSINESS_ERROR",
            ErrorKind::Server => "SERVER_ERROR",
            ErrorKind::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Transient kinds that may succeed when re-attempted
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorKind::Network | ErrorKind::Timeout | ErrorKind::Server)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
