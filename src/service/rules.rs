//! Rule operations

use serde_json::{json, Value};

use super::endpoints;
use super::validation::{is_valid_timestamp, validate_import_file, validate_test_request};
use crate::config::ClientConfig;
use crate::errors::{business_error, ApiResult, StandardError};
use crate::guards::{
    domain_rule, filter_valid, json_type_name, paged_envelope, rejection, response_envelope,
    rule_statistics, test_result, validation_result, Checked,
};
use crate::model::{
    DomainRule, PagedEnvelope, RuleDraft, RuleQuery, RuleStatistics, TestResult, TestRuleRequest,
    ValidationResult,
};
use crate::observability::Logger;
use crate::transport::{Interceptor, ResponseBody, Transport, TransportRequest};

/// Client for the rule-definition backend
pub struct RuleService<T> {
    interceptor: Interceptor<T>,
    config: ClientConfig,
}

impl<T: Transport> RuleService<T> {
    pub fn new(interceptor: Interceptor<T>) -> Self {
        Self {
            interceptor,
            config: ClientConfig::default(),
        }
    }

    /// Use `config` for pagination and upload limits
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn interceptor(&self) -> &Interceptor<T> {
        &self.interceptor
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn logger(&self) -> &Logger {
        self.interceptor.logger()
    }

    /// All rules, optionally filtered by status or keyword
    pub async fn list_rules(
        &self,
        enabled: Option<bool>,
        keyword: Option<&str>,
    ) -> ApiResult<Vec<DomainRule>> {
        let mut request = TransportRequest::get(endpoints::RULES);
        if let Some(enabled) = enabled {
            request = request.query("enabled", enabled.to_string());
        }
        if let Some(keyword) = keyword.filter(|k| !k.trim().is_empty()) {
            request = request.query("keyword", keyword);
        }
        let data = self.fetch(request).await?;
        self.rule_list(data, "list_rules")
    }

    /// One page of rules.
    ///
    /// Malformed items are dropped from `content`; the page counters are
    /// passed through unchanged. A page holding more items than its `size`
    /// is logged as `PAGE_OVERSIZED` and returned as is.
    pub async fn list_rules_paged(&self, query: &RuleQuery) -> ApiResult<PagedEnvelope<DomainRule>> {
        let pages = &self.config.pagination;
        if query.page == 0 {
            return Err(StandardError::validation("page must be a positive integer"));
        }
        if !pages.contains(query.size) {
            return Err(StandardError::validation(format!(
                "page size must be between {} and {}",
                pages.min_page_size, pages.max_page_size
            )));
        }
        for bound in [&query.create_time_start, &query.create_time_end]
            .into_iter()
            .flatten()
        {
            if !is_valid_timestamp(bound) {
                return Err(StandardError::validation(format!("invalid timestamp: {}", bound)));
            }
        }

        let request = TransportRequest::get(endpoints::RULES).params(query.to_params());
        let data = self.fetch(request).await?;
        let mut page = self.guarded(paged_envelope(&data), "list_rules_paged")?;
        if page.content.len() as u64 > page.size {
            self.logger().warn(
                "PAGE_OVERSIZED",
                &[
                    ("context", "list_rules_paged"),
                    ("items", &page.content.len().to_string()),
                    ("size", &page.size.to_string()),
                ],
            );
        }
        let content = std::mem::take(&mut page.content);
        let rules = filter_valid(content, domain_rule, self.logger(), "list_rules_paged");
        Ok(page.with_content(rules))
    }

    pub async fn get_rule(&self, id: u64) -> ApiResult<DomainRule> {
        check_id(id)?;
        let data = self.fetch(TransportRequest::get(endpoints::rule(id))).await?;
        self.guarded(domain_rule(&data), "get_rule")
    }

    pub async fn create_rule(&self, draft: &RuleDraft) -> ApiResult<DomainRule> {
        check_draft(draft)?;
        let request = TransportRequest::post(endpoints::RULES).json(to_json(draft)?);
        let data = self.fetch(request).await?;
        self.guarded(domain_rule(&data), "create_rule")
    }

    pub async fn update_rule(&self, id: u64, draft: &RuleDraft) -> ApiResult<DomainRule> {
        check_id(id)?;
        check_draft(draft)?;
        let request = TransportRequest::put(endpoints::rule(id)).json(to_json(draft)?);
        let data = self.fetch(request).await?;
        self.guarded(domain_rule(&data), "update_rule")
    }

    pub async fn delete_rule(&self, id: u64) -> ApiResult<()> {
        check_id(id)?;
        self.fetch(TransportRequest::delete(endpoints::rule(id))).await?;
        Ok(())
    }

    /// Delete several rules in one call
    pub async fn delete_rules(&self, ids: &[u64]) -> ApiResult<()> {
        if ids.is_empty() {
            return Err(StandardError::validation("rule ID list must not be empty"));
        }
        if ids.contains(&0) {
            return Err(StandardError::validation("some rule IDs are invalid"));
        }
        let request = TransportRequest::delete(endpoints::RULES).json(json!({ "ids": ids }));
        self.fetch(request).await?;
        Ok(())
    }

    /// Enable or disable a rule, returning its new state
    pub async fn toggle_rule_status(&self, id: u64, enabled: bool) -> ApiResult<DomainRule> {
        check_id(id)?;
        let request = TransportRequest::patch(endpoints::rule_status(id))
            .query("enabled", enabled.to_string())
            .json(json!({ "enabled": enabled }));
        let data = self.fetch(request).await?;
        self.guarded(domain_rule(&data), "toggle_rule_status")
    }

    /// Server-side syntax check of a rule body
    pub async fn validate_rule(&self, rule_content: &str) -> ApiResult<ValidationResult> {
        if rule_content.trim().is_empty() {
            return Err(StandardError::validation("rule content must not be empty"));
        }
        let request =
            TransportRequest::post(endpoints::RULE_VALIDATE).json(json!({ "ruleContent": rule_content }));
        let data = self.fetch(request).await?;
        self.guarded(validation_result(&data), "validate_rule")
    }

    /// Execute rules against test facts
    pub async fn test_rule(&self, request: &TestRuleRequest) -> ApiResult<TestResult> {
        validate_test_request(request)?;
        let request = TransportRequest::post(endpoints::RULE_TEST).json(to_json(request)?);
        let data = self.fetch(request).await?;
        self.guarded(test_result(&data), "test_rule")
    }

    pub async fn rule_statistics(&self) -> ApiResult<RuleStatistics> {
        let data = self.fetch(TransportRequest::get(endpoints::RULE_STATISTICS)).await?;
        self.guarded(rule_statistics(&data), "rule_statistics")
    }

    /// Rules whose name or content matches `keyword`
    pub async fn search_rules(&self, keyword: &str) -> ApiResult<Vec<DomainRule>> {
        if keyword.trim().is_empty() {
            return Err(StandardError::validation("search keyword must not be empty"));
        }
        let request = TransportRequest::get(endpoints::RULE_SEARCH).query("keyword", keyword);
        let data = self.fetch(request).await?;
        self.rule_list(data, "search_rules")
    }

    /// Export the given rules, or all of them, as a binary document
    pub async fn export_rules(&self, ids: Option<&[u64]>) -> ApiResult<Vec<u8>> {
        if ids.map_or(false, |ids| ids.contains(&0)) {
            return Err(StandardError::validation("invalid rule IDs for export"));
        }
        let body = match ids {
            Some(ids) => json!({ "ids": ids }),
            None => json!({}),
        };
        let request = TransportRequest::post(endpoints::RULE_EXPORT).json(body).binary();
        match self.interceptor.execute(request).await? {
            ResponseBody::Bytes(bytes) => Ok(bytes),
            ResponseBody::Json(value) => match response_envelope(&value) {
                Checked::Valid(envelope) if !envelope.success => Err(business_error(&value)),
                _ => Err(self.invalid("export_rules", &["expected a binary export".to_string()])),
            },
        }
    }

    /// Upload a rule file and return the rules it created
    pub async fn import_rules(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<Vec<DomainRule>> {
        validate_import_file(file_name, bytes.len() as u64, &self.config.upload)?;
        let request = TransportRequest::post(endpoints::RULE_IMPORT).multipart("file", file_name, bytes);
        let data = self.fetch(request).await?;
        self.rule_list(data, "import_rules")
    }

    /// Send `request` and unwrap a successful envelope's `data`
    async fn fetch(&self, request: TransportRequest) -> ApiResult<Value> {
        let context = request.path.clone();
        let body = match self.interceptor.execute(request).await? {
            ResponseBody::Json(value) => value,
            ResponseBody::Bytes(_) => {
                return Err(self.invalid(&context, &["expected a JSON envelope".to_string()]))
            }
        };
        let envelope = self.guarded(response_envelope(&body), &context)?;
        if !envelope.success {
            return Err(business_error(&body));
        }
        Ok(envelope.data.unwrap_or(Value::Null))
    }

    fn guarded<U>(&self, checked: Checked<U>, context: &str) -> ApiResult<U> {
        match checked {
            Checked::Valid(value) => Ok(value),
            Checked::Invalid(reasons) => Err(self.invalid(context, &reasons)),
        }
    }

    fn invalid(&self, context: &str, reasons: &[String]) -> StandardError {
        self.logger().warn(
            "INVALID_RESPONSE",
            &[("context", context), ("reasons", &reasons.join("; "))],
        );
        rejection(reasons)
    }

    fn rule_list(&self, data: Value, context: &str) -> ApiResult<Vec<DomainRule>> {
        match data {
            Value::Array(items) => Ok(filter_valid(items, domain_rule, self.logger(), context)),
            other => Err(self.invalid(
                context,
                &[format!("expected a list of rules, got {}", json_type_name(&other))],
            )),
        }
    }
}

fn check_id(id: u64) -> ApiResult<()> {
    if id == 0 {
        return Err(StandardError::validation("invalid rule ID"));
    }
    Ok(())
}

fn check_draft(draft: &RuleDraft) -> ApiResult<()> {
    if draft.rule_name.trim().is_empty() {
        return Err(StandardError::validation("rule name must not be empty"));
    }
    if draft.rule_content.trim().is_empty() {
        return Err(StandardError::validation("rule content must not be empty"));
    }
    Ok(())
}

fn to_json(value: &impl serde::Serialize) -> ApiResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| StandardError::validation(format!("request is not serializable: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, TransportFailure, INVALID_DATA_FORMAT, INVALID_REQUEST};
    use crate::transport::{InFlightTracker, Method, RequestBody, ScriptedTransport, TransportResponse};
    use std::sync::Arc;

    fn service() -> (RuleService<Arc<ScriptedTransport>>, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new());
        let interceptor = Interceptor::new(transport.clone()).with_tracker(InFlightTracker::new());
        (RuleService::new(interceptor), transport)
    }

    fn rule(id: u64) -> Value {
        json!({
            "id": id,
            "ruleName": format!("rule-{}", id),
            "ruleContent": "rule \"r\" when then end",
            "enabled": true
        })
    }

    #[tokio::test]
    async fn test_get_rule() {
        let (service, transport) = service();
        transport.push_envelope(rule(3));

        let fetched = service.get_rule(3).await.unwrap();
        assert_eq!(fetched.id, Some(3));
        assert_eq!(transport.last_request().unwrap().path, "/rules/3");
    }

    #[tokio::test]
    async fn test_invalid_id_never_reaches_transport() {
        let (service, transport) = service();

        for err in [
            service.get_rule(0).await.unwrap_err(),
            service.delete_rule(0).await.unwrap_err(),
            service.toggle_rule_status(0, true).await.unwrap_err(),
            service.delete_rules(&[]).await.unwrap_err(),
            service.delete_rules(&[1, 0]).await.unwrap_err(),
        ] {
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert_eq!(err.code(), Some(INVALID_REQUEST));
        }
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_business_failure_surfaces() {
        let (service, transport) = service();
        transport.push_ok(json!({
            "success": false,
            "message": "Rule not found",
            "code": "RULE_NOT_FOUND"
        }));

        let err = service.get_rule(9).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Business);
        assert_eq!(err.code(), Some("RULE_NOT_FOUND"));
        assert_eq!(err.message(), "Rule not found");
    }

    #[tokio::test]
    async fn test_malformed_envelope() {
        let (service, transport) = service();
        transport.push_ok(json!({"ok": true}));

        let err = service.rule_statistics().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.code(), Some(INVALID_DATA_FORMAT));
        assert_eq!(err.message(), "invalid response format");
    }

    #[tokio::test]
    async fn test_malformed_single_rule_is_an_error() {
        let (service, transport) = service();
        transport.push_envelope(json!({"id": 3, "ruleName": "x"}));

        let err = service.get_rule(3).await.unwrap_err();
        assert_eq!(err.code(), Some(INVALID_DATA_FORMAT));
    }

    #[tokio::test]
    async fn test_list_rules_filters() {
        let (service, transport) = service();
        transport.push_envelope(json!([rule(1), {"junk": true}, rule(2)]));

        let rules = service.list_rules(Some(true), Some("disc")).await.unwrap();
        assert_eq!(rules.len(), 2);

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.query_value("enabled"), Some("true"));
        assert_eq!(sent.query_value("keyword"), Some("disc"));
    }

    #[tokio::test]
    async fn test_paged_query_validation() {
        let (service, transport) = service();

        assert!(service.list_rules_paged(&RuleQuery::new(0, 20)).await.is_err());
        assert!(service.list_rules_paged(&RuleQuery::new(1, 4)).await.is_err());
        assert!(service.list_rules_paged(&RuleQuery::new(1, 101)).await.is_err());
        let bad_dates = RuleQuery::new(1, 20).created_between("yesterday", "2024-01-01T00:00:00");
        assert!(service.list_rules_paged(&bad_dates).await.is_err());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_create_rule() {
        let (service, transport) = service();
        transport.push_envelope(rule(10));

        let draft = RuleDraft::new("rule-10", "rule \"r\" when then end");
        let created = service.create_rule(&draft).await.unwrap();
        assert_eq!(created.id, Some(10));

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.method, Method::Post);
        match sent.body {
            RequestBody::Json(body) => assert_eq!(body["ruleName"], "rule-10"),
            other => panic!("unexpected body {:?}", other),
        }

        let empty = RuleDraft::new(" ", "x");
        assert!(service.create_rule(&empty).await.is_err());
    }

    #[tokio::test]
    async fn test_toggle_status_request() {
        let (service, transport) = service();
        let mut disabled = rule(4);
        disabled["enabled"] = json!(false);
        transport.push_envelope(disabled);

        let updated = service.toggle_rule_status(4, false).await.unwrap();
        assert!(!updated.enabled);

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.method, Method::Patch);
        assert_eq!(sent.path, "/rules/4/status");
        assert_eq!(sent.query_value("enabled"), Some("false"));
        assert_eq!(sent.body, RequestBody::Json(json!({"enabled": false})));
    }

    #[tokio::test]
    async fn test_delete_rules_body() {
        let (service, transport) = service();
        transport.push_ok(json!({"success": true, "data": null}));

        service.delete_rules(&[1, 2, 3]).await.unwrap();
        let sent = transport.last_request().unwrap();
        assert_eq!(sent.method, Method::Delete);
        assert_eq!(sent.body, RequestBody::Json(json!({"ids": [1, 2, 3]})));
    }

    #[tokio::test]
    async fn test_validate_rule() {
        let (service, transport) = service();
        transport.push_envelope(json!({
            "valid": false,
            "errors": [{"field": "ruleContent", "message": "unexpected token"}],
            "errorMessage": "syntax error"
        }));

        let result = service.validate_rule("rule x when then end").await.unwrap();
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(transport.last_request().unwrap().path, "/rules/test/validate");

        assert!(service.validate_rule("  ").await.is_err());
    }

    #[tokio::test]
    async fn test_test_rule() {
        let (service, transport) = service();
        transport.push_envelope(json!({
            "success": true,
            "executionTime": 4,
            "firedRulesCount": 0
        }));

        let result = service
            .test_rule(&TestRuleRequest::for_rules(vec![1]))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.fired_rules.is_empty());

        assert!(service.test_rule(&TestRuleRequest::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_search_rules() {
        let (service, transport) = service();
        transport.push_envelope(json!([rule(1)]));

        let rules = service.search_rules("rule").await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(transport.last_request().unwrap().path, "/rules/search");
        assert!(service.search_rules("").await.is_err());
    }

    #[tokio::test]
    async fn test_statistics() {
        let (service, transport) = service();
        transport.push_envelope(json!({"totalRules": 3, "enabledRules": 2, "disabledRules": 1}));

        let stats = service.rule_statistics().await.unwrap();
        assert_eq!(stats.total_rules, 3);
    }

    #[tokio::test]
    async fn test_export_rules() {
        let (service, transport) = service();
        transport.push(Ok(TransportResponse::bytes(b"rule \"a\" end".to_vec())));

        let bytes = service.export_rules(Some(&[1, 2][..])).await.unwrap();
        assert_eq!(bytes, b"rule \"a\" end");
        assert_eq!(
            transport.last_request().unwrap().body,
            RequestBody::Json(json!({"ids": [1, 2]}))
        );

        transport.push_ok(json!({"success": false, "message": "export failed"}));
        let err = service.export_rules(None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Business);

        assert!(service.export_rules(Some(&[0][..])).await.is_err());
    }

    #[tokio::test]
    async fn test_import_rules() {
        let (service, transport) = service();
        transport.push_envelope(json!([rule(5), "junk"]));

        let imported = service
            .import_rules("rules.drl", b"rule \"a\" when then end".to_vec())
            .await
            .unwrap();
        assert_eq!(imported.len(), 1);

        match transport.last_request().unwrap().body {
            RequestBody::Multipart { field, file_name, .. } => {
                assert_eq!(field, "file");
                assert_eq!(file_name, "rules.drl");
            }
            other => panic!("unexpected body {:?}", other),
        }

        assert!(service.import_rules("rules.exe", vec![1]).await.is_err());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_is_normalized() {
        let (service, transport) = service();
        transport.push_failure(TransportFailure::status(
            422,
            Some(json!({"message": "Rule name invalid", "errors": [{"field": "ruleName", "message": "too long"}]})),
        ));

        let err = service
            .create_rule(&RuleDraft::new("r", "rule when then end"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), "Rule name invalid");
        assert_eq!(err.field_errors()[0].field, "ruleName");
    }
}
