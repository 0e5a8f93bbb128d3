//! Domain payload guards

use serde_json::Value;

use super::checked::Checked;
use super::inspect::{json_type_name, Inspector, Kind};
use crate::model::{DomainRule, RuleStatistics, TestResult, ValidationResult};
use crate::observability::Logger;

/// Whether `value` is a positive integer id
pub fn is_valid_id(value: &Value) -> bool {
    value.as_u64().map_or(false, |id| id > 0)
}

/// Check one rule as returned by the backend
pub fn domain_rule(value: &Value) -> Checked<DomainRule> {
    let mut check = Inspector::new(value, "rule");
    check
        .required("ruleName", Kind::String)
        .required("ruleContent", Kind::String)
        .required("enabled", Kind::Bool)
        .optional("description", Kind::String)
        .optional("createTime", Kind::String)
        .optional("updateTime", Kind::String)
        .optional("version", Kind::String);

    if let Some(id) = check.get("id") {
        if !is_valid_id(id) {
            check.reject(format!("field `id` must be a positive integer, got {}", id));
        }
    }
    check.finish()
}

/// Check a syntax-validation result.
///
/// A missing `errors` list is read as no errors.
pub fn validation_result(value: &Value) -> Checked<ValidationResult> {
    let mut check = Inspector::new(value, "validation result");
    check
        .required("valid", Kind::Bool)
        .optional("errors", Kind::Array)
        .optional("errorMessage", Kind::String)
        .optional("warningMessage", Kind::String);

    let items = check.get("errors").and_then(Value::as_array);
    for (index, item) in items.into_iter().flatten().enumerate() {
        let mut entry = Inspector::new(item, "validation error");
        entry
            .required("field", Kind::String)
            .required("message", Kind::String)
            .optional("code", Kind::String);
        for reason in entry.finish::<Value>().reasons() {
            check.reject(format!("errors[{}]: {}", index, reason));
        }
    }
    check.finish()
}

/// Check a test-execution result
pub fn test_result(value: &Value) -> Checked<TestResult> {
    let mut check = Inspector::new(value, "test result");
    check
        .required("success", Kind::Bool)
        .required("executionTime", Kind::Uint)
        .required("firedRulesCount", Kind::Uint)
        .optional("firedRules", Kind::Array)
        .optional("resultData", Kind::Object)
        .optional("errorMessage", Kind::String)
        .optional("errorDetails", Kind::String);

    let fired = check.get("firedRules").and_then(Value::as_array);
    for (index, item) in fired.into_iter().flatten().enumerate() {
        let name = item.get("ruleName");
        if !name.map_or(false, Value::is_string) {
            check.reject(format!(
                "firedRules[{}]: field `ruleName` must be a string, got {}",
                index,
                name.map_or("nothing", json_type_name)
            ));
        }
    }
    check.finish()
}

/// Check the aggregate counters
pub fn rule_statistics(value: &Value) -> Checked<RuleStatistics> {
    let mut check = Inspector::new(value, "rule statistics");
    check
        .required("totalRules", Kind::Uint)
        .required("enabledRules", Kind::Uint)
        .required("disabledRules", Kind::Uint)
        .optional("loadedRules", Kind::Uint)
        .optional("recentlyCreated", Kind::Uint)
        .optional("recentlyUpdated", Kind::Uint);
    check.finish()
}

/// Keep the items that pass `guard`, dropping the rest.
///
/// Dropped items are logged as `ITEMS_DROPPED`, never escalated.
pub fn filter_valid<T>(
    items: Vec<Value>,
    guard: impl Fn(&Value) -> Checked<T>,
    logger: &Logger,
    context: &str,
) -> Vec<T> {
    let total = items.len();
    let mut kept = Vec::with_capacity(total);
    let mut first_reason = None;

    for item in &items {
        match guard(item) {
            Checked::Valid(value) => kept.push(value),
            Checked::Invalid(reasons) => {
                if first_reason.is_none() {
                    first_reason = reasons.into_iter().next();
                }
            }
        }
    }

    let dropped = total - kept.len();
    if dropped > 0 {
        logger.warn(
            "ITEMS_DROPPED",
            &[
                ("context", context),
                ("dropped", &dropped.to_string()),
                ("total", &total.to_string()),
                ("reason", first_reason.as_deref().unwrap_or("")),
            ],
        );
    }
    kept
}
