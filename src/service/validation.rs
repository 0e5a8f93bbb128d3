//! Local, advisory checks on rule data.
//!
//! None of these touch the network, and none replace server-side
//! compilation of the rule language.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use serde_json::json;

use crate::config::UploadConfig;
use crate::errors::{ApiResult, StandardError};
use crate::model::{FieldError, RuleDraft, TestRuleRequest};

pub const MAX_RULE_NAME_CHARS: usize = 255;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Markers every rule body must mention, in any order
const REQUIRED_MARKERS: [&str; 4] = ["rule", "when", "then", "end"];

/// Characters a rule name may not contain
const UNSAFE_NAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Rule name: non-empty, at most 255 characters, none of `< > : " / \ | ? *`
pub fn validate_rule_name(name: &str) -> Result<(), FieldError> {
    if name.trim().is_empty() {
        return Err(field_error("ruleName", "REQUIRED", "rule name must not be empty"));
    }
    if name.chars().count() > MAX_RULE_NAME_CHARS {
        return Err(field_error(
            "ruleName",
            "TOO_LONG",
            format!("rule name must be at most {} characters", MAX_RULE_NAME_CHARS),
        ));
    }
    if name.contains(&UNSAFE_NAME_CHARS[..]) {
        return Err(field_error(
            "ruleName",
            "INVALID_CHARACTERS",
            r#"rule name must not contain < > : " / \ | ? *"#,
        ));
    }
    Ok(())
}

/// Rule content: non-empty and mentioning `rule`, `when`, `then` and `end`
/// (case-insensitive substring check, not a parser)
pub fn validate_rule_content(content: &str) -> Result<(), FieldError> {
    if content.trim().is_empty() {
        return Err(field_error("ruleContent", "REQUIRED", "rule content must not be empty"));
    }
    let lowered = content.to_lowercase();
    if let Some(marker) = REQUIRED_MARKERS.iter().find(|m| !lowered.contains(*m)) {
        return Err(field_error(
            "ruleContent",
            "MISSING_KEYWORD",
            format!("rule content must contain `{}`", marker),
        ));
    }
    Ok(())
}

/// Description: at most 1000 characters when present
pub fn validate_description(description: Option<&str>) -> Result<(), FieldError> {
    match description {
        Some(text) if text.chars().count() > MAX_DESCRIPTION_CHARS => Err(field_error(
            "description",
            "TOO_LONG",
            format!("description must be at most {} characters", MAX_DESCRIPTION_CHARS),
        )),
        _ => Ok(()),
    }
}

/// Every advisory check on a draft, collecting all failures
pub fn validate_rule(draft: &RuleDraft) -> Result<(), Vec<FieldError>> {
    let errors: Vec<FieldError> = [
        validate_rule_name(&draft.rule_name),
        validate_rule_content(&draft.rule_content),
        validate_description(draft.description.as_deref()),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `Validation` error carrying field errors in its details
pub fn field_errors_to_error(message: &str, errors: &[FieldError]) -> StandardError {
    StandardError::validation(message).with_details(json!(errors))
}

/// RFC 3339, or `YYYY-MM-DDTHH:MM:SS[.fff]` / `YYYY-MM-DD HH:MM:SS` without
/// an offset
pub fn is_valid_timestamp(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").is_ok()
}

/// Import file: non-empty, within the size limit, allowed extension
pub fn validate_import_file(file_name: &str, size: u64, upload: &UploadConfig) -> ApiResult<()> {
    if file_name.trim().is_empty() {
        return Err(StandardError::validation("import file name must not be empty"));
    }
    if size == 0 {
        return Err(StandardError::validation("import file is empty"));
    }
    if size > upload.max_file_size {
        return Err(StandardError::validation(format!(
            "import file is {} bytes, the limit is {}",
            size, upload.max_file_size
        )));
    }
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()));
    let allowed = extension
        .as_deref()
        .map_or(false, |ext| upload.allowed_extensions.iter().any(|a| a.eq_ignore_ascii_case(ext)));
    if !allowed {
        return Err(StandardError::validation(format!(
            "import file must end with one of {}",
            upload.allowed_extensions.join(", ")
        )));
    }
    Ok(())
}

/// A test run needs non-empty rule content or at least one positive rule id
pub fn validate_test_request(request: &TestRuleRequest) -> ApiResult<()> {
    let has_content = request
        .rule_content
        .as_deref()
        .map_or(false, |c| !c.trim().is_empty());

    match request.rule_ids.as_deref() {
        Some(ids) if ids.contains(&0) => Err(StandardError::validation("invalid rule ID in test request")),
        Some(ids) if !ids.is_empty() => Ok(()),
        _ if has_content => Ok(()),
        _ => Err(StandardError::validation(
            "test request needs rule content or rule IDs",
        )),
    }
}

fn field_error(field: &str, code: &str, message: impl Into<String>) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.into(),
        code: Some(code.to_string()),
    }
}
