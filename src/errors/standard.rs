//! The normalized error every operation surfaces

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};

use super::failure::Failure;
use super::kind::ErrorKind;
use crate::model::FieldError;

/// Result type for client operations
pub type ApiResult<T> = Result<T, StandardError>;

/// A normalized failure.
///
/// Constructed once and never mutated afterwards; a retry that fails again
/// produces a fresh `StandardError`. `message` is always non-empty.
#[derive(Debug, Clone)]
pub struct StandardError {
    kind: ErrorKind,
    code: Option<String>,
    message: String,
    details: Option<Value>,
    cause: Option<Arc<Failure>>,
}

impl StandardError {
    /// Create an error of the given kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            super::normalize::UNKNOWN_MESSAGE.to_string()
        } else {
            message
        };
        Self {
            kind,
            code: None,
            message,
            details: None,
            cause: None,
        }
    }

    /// Local argument check failed
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message).with_code(super::INVALID_REQUEST)
    }

    /// Server payload did not have the expected shape
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message).with_code(super::INVALID_DATA_FORMAT)
    }

    /// Attach a machine-readable code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach opaque details
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach the failure this error was normalized from
    pub fn with_cause(mut self, cause: Failure) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Returns the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error code, if any
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Returns the human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the opaque details, if any
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Returns the original failure, if any
    pub fn cause(&self) -> Option<&Failure> {
        self.cause.as_deref()
    }

    /// Whether the failure is transient
    pub fn is_retryable(&self) -> bool {
        self.kind.is_transient()
    }

    /// Field errors carried in `details`.
    ///
    /// Entries that are not `{field, message, code?}` objects are skipped.
    pub fn field_errors(&self) -> Vec<FieldError> {
        match &self.details {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Message suitable for direct display.
    ///
    /// Validation errors with field details are rendered as
    /// `"<message>: <detail>; <detail>"`.
    pub fn display_message(&self) -> String {
        if self.kind != ErrorKind::Validation {
            return self.message.clone();
        }
        let parts: Vec<String> = match &self.details {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| {
                    item.get("message")
                        .or_else(|| item.get("field"))
                        .and_then(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                })
                .collect(),
            _ => Vec::new(),
        };
        if parts.is_empty() {
            self.message.clone()
        } else {
            format!("{}: {}", self.message, parts.join("; "))
        }
    }

    /// JSON projection (the cause is not serialized)
    pub fn to_json(&self) -> Value {
        json!({
            "kind": self.kind.as_str(),
            "code": self.code,
            "message": self.message,
            "details": self.details,
        })
    }
}

impl PartialEq for StandardError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.code == other.code
            && self.message == other.message
            && self.details == other.details
    }
}

impl fmt::Display for StandardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{}] {}: {}", self.kind, code, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

impl Error for StandardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|c| c as &(dyn Error + 'static))
    }
}
