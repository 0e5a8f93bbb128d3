//! Request, response and error stages around every transport call

use std::sync::Arc;

use uuid::Uuid;

use super::credentials::{CredentialStore, MemoryCredentialStore};
use super::inflight::InFlightTracker;
use super::request::{ResponseBody, TransportRequest};
use super::Transport;
use crate::errors::{
    business_error, is_business_failure, normalize, ApiResult, StandardError, SILENT_CODES,
};
use crate::observability::{Logger, NoOpNotifier, Notifier};

/// Correlation id attached to every request
pub const REQUEST_ID_HEADER: &str = "x-request-id";
/// Set to `false` to keep a request out of the in-flight count
pub const SHOW_LOADING_HEADER: &str = "show-loading";

const UNAUTHORIZED: u16 = 401;

/// Wraps a transport with the interception stages.
///
/// Request stage: attach a request id and the stored bearer credential,
/// then count the request as in flight unless it opted out.
/// Response stage: release the count and pass the body through, reporting
/// envelope-level business failures without turning them into errors.
/// Error stage: release the count, normalize, report and return the error.
pub struct Interceptor<T> {
    transport: T,
    tracker: InFlightTracker,
    credentials: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    logger: Logger,
}

impl<T: Transport> Interceptor<T> {
    /// Intercept `transport`, counting requests on the process-wide tracker
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            tracker: InFlightTracker::global(),
            credentials: Arc::new(MemoryCredentialStore::new()),
            notifier: Arc::new(NoOpNotifier),
            logger: Logger::disabled(),
        }
    }

    pub fn with_tracker(mut self, tracker: InFlightTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn tracker(&self) -> &InFlightTracker {
        &self.tracker
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request` through every stage
    pub async fn execute(&self, mut request: TransportRequest) -> ApiResult<ResponseBody> {
        let request_id = format!("req_{}", Uuid::new_v4().simple());
        request = request.header(REQUEST_ID_HEADER, request_id.as_str());
        if let Some(token) = self.credentials.token() {
            request = request.header("authorization", format!("Bearer {}", token));
        }
        let tracked = request
            .remove_header(SHOW_LOADING_HEADER)
            .map_or(true, |flag| flag != "false");

        let method = request.method.as_str();
        let path = request.path.clone();
        self.logger.trace(
            "HTTP_REQUEST",
            &[("method", method), ("path", &path), ("request_id", &request_id)],
        );

        let outcome = {
            let _slot = tracked.then(|| self.tracker.acquire());
            self.transport.send(request).await
        };

        match outcome {
            Ok(response) => {
                self.logger.trace(
                    "HTTP_RESPONSE",
                    &[
                        ("path", &path),
                        ("request_id", &request_id),
                        ("status", &response.status.to_string()),
                    ],
                );
                if let ResponseBody::Json(body) = &response.body {
                    if is_business_failure(body) {
                        self.report_business_failure(body, &path, &request_id);
                    }
                }
                Ok(response.body)
            }
            Err(failure) => {
                if failure.http_status() == Some(UNAUTHORIZED) {
                    self.credentials.clear();
                }
                let err = normalize(failure);
                self.logger.error(
                    "HTTP_ERROR",
                    &[
                        ("code", err.code().unwrap_or("")),
                        ("kind", err.kind().as_str()),
                        ("message", err.message()),
                        ("path", &path),
                        ("request_id", &request_id),
                    ],
                );
                self.notifier.notify(&err);
                Err(err)
            }
        }
    }

    fn report_business_failure(&self, body: &serde_json::Value, path: &str, request_id: &str) {
        let err: StandardError = business_error(body);
        self.logger.warn(
            "BUSINESS_FAILURE",
            &[
                ("code", err.code().unwrap_or("")),
                ("message", err.message()),
                ("path", path),
                ("request_id", request_id),
            ],
        );
        let silent = err.code().map_or(false, |code| SILENT_CODES.contains(&code));
        if !silent {
            self.notifier.notify(&err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, TransportFailure};
    use crate::observability::MemoryNotifier;
    use crate::transport::{ScriptedTransport, TransportResponse};
    use serde_json::json;

    struct Fixture {
        interceptor: Interceptor<Arc<ScriptedTransport>>,
        transport: Arc<ScriptedTransport>,
        notifier: Arc<MemoryNotifier>,
        credentials: Arc<MemoryCredentialStore>,
    }

    fn fixture() -> Fixture {
        let transport = Arc::new(ScriptedTransport::new());
        let notifier = Arc::new(MemoryNotifier::new());
        let credentials = Arc::new(MemoryCredentialStore::with_token("secret"));
        let interceptor = Interceptor::new(transport.clone())
            .with_tracker(InFlightTracker::new())
            .with_notifier(notifier.clone())
            .with_credentials(credentials.clone());
        Fixture {
            interceptor,
            transport,
            notifier,
            credentials,
        }
    }

    #[tokio::test]
    async fn test_request_metadata() {
        let f = fixture();
        f.transport.push_ok(json!({"success": true, "data": []}));

        f.interceptor
            .execute(TransportRequest::get("/rules"))
            .await
            .unwrap();

        let sent = f.transport.last_request().unwrap();
        let id = sent.header_value(REQUEST_ID_HEADER).unwrap();
        assert!(id.starts_with("req_"));
        assert_eq!(id.len(), 4 + 32);
        assert_eq!(sent.header_value("authorization"), Some("Bearer secret"));
    }

    #[tokio::test]
    async fn test_request_ids_unique() {
        let f = fixture();
        f.transport.push_ok(json!({"success": true, "data": 1}));
        f.transport.push_ok(json!({"success": true, "data": 2}));

        f.interceptor.execute(TransportRequest::get("/a")).await.unwrap();
        f.interceptor.execute(TransportRequest::get("/b")).await.unwrap();

        let requests = f.transport.requests();
        assert_ne!(
            requests[0].header_value(REQUEST_ID_HEADER),
            requests[1].header_value(REQUEST_ID_HEADER)
        );
    }

    #[tokio::test]
    async fn test_no_credential_no_header() {
        let f = fixture();
        f.credentials.clear();
        f.transport.push_ok(json!({"success": true, "data": null}));

        f.interceptor.execute(TransportRequest::get("/rules")).await.unwrap();
        assert!(f.transport.last_request().unwrap().header_value("authorization").is_none());
    }

    #[tokio::test]
    async fn test_show_loading_opt_out_is_stripped() {
        let f = fixture();
        let mut rx = f.interceptor.tracker().subscribe();
        f.transport.push_ok(json!({"success": true, "data": null}));

        let request = TransportRequest::get("/rules").header(SHOW_LOADING_HEADER, "false");
        f.interceptor.execute(request).await.unwrap();

        let sent = f.transport.last_request().unwrap();
        assert!(sent.header_value(SHOW_LOADING_HEADER).is_none());
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_business_failure_passes_through() {
        let f = fixture();
        let body = json!({"success": false, "message": "Rule not found", "code": "RULE_NOT_FOUND"});
        f.transport.push_ok(body.clone());

        let out = f.interceptor.execute(TransportRequest::get("/rules/9")).await.unwrap();
        assert_eq!(out, ResponseBody::Json(body));
        assert_eq!(f.notifier.len(), 1);
        assert_eq!(f.notifier.records()[0].kind(), ErrorKind::Business);
    }

    #[tokio::test]
    async fn test_silent_business_codes_not_notified() {
        let f = fixture();
        f.transport.push_ok(json!({
            "success": false,
            "message": "syntax error at line 3",
            "code": "RULE_SYNTAX_ERROR"
        }));

        f.interceptor.execute(TransportRequest::post("/rules")).await.unwrap();
        assert!(f.notifier.is_empty());
    }

    #[tokio::test]
    async fn test_error_stage_normalizes_and_releases() {
        let f = fixture();
        f.transport.push_failure(TransportFailure::status(503, None));

        let err = f
            .interceptor
            .execute(TransportRequest::get("/rules"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(f.interceptor.tracker().count(), 0);
        assert_eq!(f.notifier.len(), 1);
    }

    #[tokio::test]
    async fn test_unauthorized_clears_credential() {
        let f = fixture();
        f.transport.push_failure(TransportFailure::status(401, None));

        let err = f
            .interceptor
            .execute(TransportRequest::get("/rules"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("HTTP_401"));
        assert_eq!(f.credentials.token(), None);
    }

    #[tokio::test]
    async fn test_binary_body_passes_through() {
        let f = fixture();
        f.transport.push(Ok(TransportResponse::bytes(b"rule".to_vec())));

        let out = f
            .interceptor
            .execute(TransportRequest::post("/rules/export").binary())
            .await
            .unwrap();
        assert_eq!(out, ResponseBody::Bytes(b"rule".to_vec()));
    }
}
