//! Guard outcome

use serde_json::json;

use crate::errors::{ApiResult, StandardError};

/// Message of the error raised when a top-level payload fails its guard
pub const INVALID_RESPONSE_MESSAGE: &str = "invalid response format";

/// Outcome of a guard
#[derive(Debug, Clone, PartialEq)]
pub enum Checked<T> {
    /// The payload has the expected shape
    Valid(T),
    /// The payload was rejected, with one reason per failed check
    Invalid(Vec<String>),
}

impl<T> Checked<T> {
    /// Predicate view of the guard
    pub fn is_ok(&self) -> bool {
        matches!(self, Checked::Valid(_))
    }

    /// Rejection reasons; empty when valid
    pub fn reasons(&self) -> &[String] {
        match self {
            Checked::Valid(_) => &[],
            Checked::Invalid(reasons) => reasons,
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Checked::Valid(value) => Some(value),
            Checked::Invalid(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Checked<U> {
        match self {
            Checked::Valid(value) => Checked::Valid(f(value)),
            Checked::Invalid(reasons) => Checked::Invalid(reasons),
        }
    }

    /// Escalate a rejection into an `invalid response format` error
    pub fn into_result(self) -> ApiResult<T> {
        match self {
            Checked::Valid(value) => Ok(value),
            Checked::Invalid(reasons) => Err(rejection(&reasons)),
        }
    }
}

/// The `invalid response format` error for a rejected payload
pub fn rejection(reasons: &[String]) -> StandardError {
    StandardError::invalid_response(INVALID_RESPONSE_MESSAGE).with_details(json!(reasons))
}
