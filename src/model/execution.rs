//! Rule test-execution requests and results

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A fact to insert into the rule session before firing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleFactConfig {
    /// Variable name of the fact, e.g. `$student`
    pub fact_name: String,
    /// Fully-qualified class name of the fact
    pub class_name: String,
    #[serde(default)]
    pub field_values: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_execution_details: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_to_history: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate_input: Option<bool>,
}

/// Request to execute rules against test data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRuleRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_ids: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_configs: Option<Vec<RuleFactConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<TestOptions>,
}

impl TestRuleRequest {
    /// Test the stored rules with the given ids
    pub fn for_rules(ids: Vec<u64>) -> Self {
        Self {
            rule_ids: Some(ids),
            ..Default::default()
        }
    }

    /// Test an unsaved rule body
    pub fn for_content(content: impl Into<String>) -> Self {
        Self {
            rule_content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn with_fact(mut self, fact: RuleFactConfig) -> Self {
        self.rule_configs.get_or_insert_with(Vec::new).push(fact);
        self
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = Some(true);
        self
    }
}

/// A rule that fired during a test execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiredRule {
    pub rule_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Outcome of a test execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub success: bool,
    pub execution_time: u64,
    pub fired_rules_count: u64,
    #[serde(default)]
    pub fired_rules: Vec<FiredRule>,
    #[serde(default)]
    pub result_data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
    /// Free-form execution trace; its shape varies between backend versions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_details: Option<Value>,
}
