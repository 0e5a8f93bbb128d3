//! Rule entities

use serde::{Deserialize, Serialize};

/// A rule definition as owned by the backend.
///
/// The client only ever holds read-only projections of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub rule_name: String,
    pub rule_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A locally-constructed rule used for create and update requests (no `id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDraft {
    pub rule_name: String,
    pub rule_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl RuleDraft {
    /// Create an enabled draft with no description
    pub fn new(rule_name: impl Into<String>, rule_content: impl Into<String>) -> Self {
        Self {
            rule_name: rule_name.into(),
            rule_content: rule_content.into(),
            description: None,
            enabled: true,
            version: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Sort direction for paged queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Query parameters for a paged rule listing.
///
/// Pages are 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleQuery {
    pub page: u64,
    pub size: u64,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub order: Option<SortOrder>,
    #[serde(default)]
    pub rule_name: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub create_time_start: Option<String>,
    #[serde(default)]
    pub create_time_end: Option<String>,
}

impl RuleQuery {
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            sort: None,
            order: None,
            rule_name: None,
            enabled: None,
            create_time_start: None,
            create_time_end: None,
        }
    }

    pub fn sorted_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(field.into());
        self.order = Some(order);
        self
    }

    pub fn with_rule_name(mut self, rule_name: impl Into<String>) -> Self {
        self.rule_name = Some(rule_name.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn created_between(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.create_time_start = Some(start.into());
        self.create_time_end = Some(end.into());
        self
    }

    /// Query-string pairs, omitting unset filters
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ];
        let optional = [
            ("sort", self.sort.clone()),
            ("order", self.order.map(|o| o.as_str().to_string())),
            ("ruleName", self.rule_name.clone()),
            ("enabled", self.enabled.map(|e| e.to_string())),
            ("createTimeStart", self.create_time_start.clone()),
            ("createTimeEnd", self.create_time_end.clone()),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                params.push((key.to_string(), value));
            }
        }
        params
    }
}

/// Aggregate counters reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleStatistics {
    pub total_rules: u64,
    pub enabled_rules: u64,
    pub disabled_rules: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded_rules: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recently_created: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recently_updated: Option<u64>,
}
