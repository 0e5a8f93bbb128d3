//! Failure normalization
//!
//! `normalize` is total: every [`Failure`] maps to exactly one
//! [`StandardError`] with a non-empty message. Classification order, first
//! match wins:
//!
//! 1. transport failure without a response: `Timeout` or `Network`
//! 2. transport failure with an HTTP status: branch on the status
//! 3. envelope with `success: false`: `Business`
//! 4. native error: `Unknown`, message preserved
//! 5. plain string: `Unknown`, message = the string
//! 6. anything else: `Unknown`, generic message

use serde_json::Value;

use super::failure::{Failure, TransportFailure, NETWORK_ERROR_MESSAGE};
use super::kind::ErrorKind;
use super::standard::StandardError;

pub(crate) const UNKNOWN_MESSAGE: &str = "Unknown error";
const TIMEOUT_MESSAGE: &str = "Request timed out, please try again later";
const NETWORK_MESSAGE: &str = "Network connection failed, please check the network";
const CONNECTION_MESSAGE: &str = "Network connection error";
const BAD_REQUEST_MESSAGE: &str = "Invalid request parameters";
const UNPROCESSABLE_MESSAGE: &str = "Data validation failed";
const CONFLICT_MESSAGE: &str = "Data conflict, please refresh and try again";
const SERVER_MESSAGE: &str = "Server error, please try again later";
const BUSINESS_MESSAGE: &str = "Business processing failed";

/// Normalize any raw failure into a [`StandardError`]
pub fn normalize(raw: impl Into<Failure>) -> StandardError {
    let failure = raw.into();
    let err = match &failure {
        Failure::Standard(err) => return err.clone(),
        Failure::Transport(transport) => from_transport(transport),
        Failure::Value(value) => from_value(value),
        Failure::Native(err) => StandardError::new(ErrorKind::Unknown, err.to_string()),
        Failure::Message(message) => StandardError::new(ErrorKind::Unknown, message.as_str()),
    };
    err.with_cause(failure)
}

/// Whether `value` is an envelope reporting a business failure
pub fn is_business_failure(value: &Value) -> bool {
    value.get("success").and_then(Value::as_bool) == Some(false)
}

/// Build the `Business` error for an envelope with `success: false`
pub fn business_error(envelope: &Value) -> StandardError {
    let message = non_empty_str(envelope, "message").unwrap_or(BUSINESS_MESSAGE);
    let mut err = StandardError::new(ErrorKind::Business, message);
    if let Some(code) = non_empty_str(envelope, "code") {
        err = err.with_code(code);
    }
    if let Some(details) = envelope.get("details").filter(|d| !d.is_null()) {
        err = err.with_details(details.clone());
    }
    err
}

fn from_transport(transport: &TransportFailure) -> StandardError {
    match transport {
        TransportFailure::NoResponse { .. } if transport.is_timeout() => {
            StandardError::new(ErrorKind::Timeout, TIMEOUT_MESSAGE)
        }
        TransportFailure::NoResponse { message, .. } if message == NETWORK_ERROR_MESSAGE => {
            StandardError::new(ErrorKind::Network, NETWORK_MESSAGE)
        }
        TransportFailure::NoResponse { .. } => StandardError::new(ErrorKind::Network, CONNECTION_MESSAGE),
        TransportFailure::Status { status, body } => from_status(*status, body.as_ref()),
    }
}

fn from_status(status: u16, body: Option<&Value>) -> StandardError {
    let server_message = body.and_then(|b| non_empty_str(b, "message"));
    let server_code = body.and_then(|b| non_empty_str(b, "code"));
    let plain_details = body.and_then(|b| b.get("details")).filter(|d| !d.is_null());

    let (kind, default_code, default_message, details) = match status {
        400 | 422 => {
            let field_errors = body
                .and_then(|b| b.get("errors"))
                .filter(|e| e.is_array());
            let (code, message) = if status == 400 {
                ("BAD_REQUEST", BAD_REQUEST_MESSAGE)
            } else {
                ("VALIDATION_ERROR", UNPROCESSABLE_MESSAGE)
            };
            (ErrorKind::Validation, code.to_string(), message.to_string(), field_errors.or(plain_details))
        }
        409 => (
            ErrorKind::Business,
            "CONFLICT".to_string(),
            CONFLICT_MESSAGE.to_string(),
            plain_details,
        ),
        500 | 502 | 503 | 504 => (
            ErrorKind::Server,
            "SERVER_ERROR".to_string(),
            SERVER_MESSAGE.to_string(),
            plain_details,
        ),
        other => (
            ErrorKind::Unknown,
            format!("HTTP_{}", other),
            format!("HTTP error ({})", other),
            plain_details,
        ),
    };

    let mut err = StandardError::new(kind, server_message.unwrap_or(default_message.as_str()))
        .with_code(server_code.unwrap_or(default_code.as_str()));
    if let Some(details) = details {
        err = err.with_details(details.clone());
    }
    err
}

fn from_value(value: &Value) -> StandardError {
    if is_business_failure(value) {
        return business_error(value);
    }
    match value {
        Value::String(message) => StandardError::new(ErrorKind::Unknown, message.as_str()),
        _ => StandardError::new(ErrorKind::Unknown, UNKNOWN_MESSAGE),
    }
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}
