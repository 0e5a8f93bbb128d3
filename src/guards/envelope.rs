//! Envelope guards

use serde_json::Value;

use super::checked::Checked;
use super::inspect::{Inspector, Kind};
use crate::model::{PagedEnvelope, ResponseEnvelope};

/// Check the response envelope, leaving `data` untyped.
///
/// `data` must be present (it may be `null`) when `success` is true, and is
/// ignored otherwise.
pub fn response_envelope(value: &Value) -> Checked<ResponseEnvelope<Value>> {
    let mut check = Inspector::new(value, "response envelope");
    check
        .required("success", Kind::Bool)
        .optional("message", Kind::String)
        .optional("code", Kind::String)
        .optional("timestamp", Kind::String);

    let succeeded = check.get("success").and_then(Value::as_bool) == Some(true);
    if succeeded && !check.has_key("data") {
        check.reject("missing field `data`");
    }
    check.finish()
}

/// Check the page shape, leaving each item untyped.
///
/// Item soundness is left to the caller's item guard.
pub fn paged_envelope(value: &Value) -> Checked<PagedEnvelope<Value>> {
    let mut check = Inspector::new(value, "paged envelope");
    check
        .required("content", Kind::Array)
        .required("totalElements", Kind::Uint)
        .required("totalPages", Kind::Uint)
        .required("page", Kind::Uint)
        .required("size", Kind::Uint)
        .required("first", Kind::Bool)
        .required("last", Kind::Bool);
    check.finish()
}
