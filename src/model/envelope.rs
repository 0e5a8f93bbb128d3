//! Response envelopes

use serde::{Deserialize, Serialize};

/// The envelope every backend response is expected to follow.
///
/// When `success` is false, `data` is irrelevant and `message` carries the
/// diagnostic text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl<T> ResponseEnvelope<T> {
    /// Successful envelope around `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            code: None,
            timestamp: None,
        }
    }
}

/// One page of a larger collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedEnvelope<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub page: u64,
    pub size: u64,
    pub first: bool,
    pub last: bool,
}

impl<T> PagedEnvelope<T> {
    /// Replace the page content, leaving every counter untouched.
    ///
    /// `total_elements` is not reconciled with the new content length.
    pub fn with_content<U>(self, content: Vec<U>) -> PagedEnvelope<U> {
        PagedEnvelope {
            content,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            page: self.page,
            size: self.size,
            first: self.first,
            last: self.last,
        }
    }
}

/// A single server-side field error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: None,
        }
    }
}

/// Result of a syntax validation performed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<FieldError>,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub warning_message: String,
}

impl ValidationResult {
    /// Whether the backend reported a warning alongside the verdict
    pub fn has_warning(&self) -> bool {
        !self.warning_message.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_wire_names() {
        let envelope = ResponseEnvelope::ok(json!({"id": 1}));
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["id"], 1);
        assert!(value.get("message").is_none());
    }

    #[test]
    fn test_paged_wire_names() {
        let page = PagedEnvelope {
            content: vec![1, 2],
            total_elements: 12,
            total_pages: 6,
            page: 1,
            size: 2,
            first: true,
            last: false,
        };
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["totalElements"], 12);
        assert_eq!(value["totalPages"], 6);
    }

    #[test]
    fn test_with_content_keeps_totals() {
        let page = PagedEnvelope {
            content: vec![1, 2, 3],
            total_elements: 3,
            total_pages: 1,
            page: 1,
            size: 10,
            first: true,
            last: true,
        };
        let trimmed = page.with_content(vec!["a"]);
        assert_eq!(trimmed.content.len(), 1);
        assert_eq!(trimmed.total_elements, 3);
    }

    #[test]
    fn test_validation_result_warning() {
        let result = ValidationResult {
            valid: true,
            warning_message: "unused import".into(),
            ..Default::default()
        };
        assert!(result.has_warning());
        assert!(!ValidationResult::default().has_warning());
    }
}
