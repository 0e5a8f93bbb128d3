//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use ruledesk::observability::{Logger, MemoryLog};
use ruledesk::transport::{InFlightTracker, Interceptor, ScriptedTransport};
use ruledesk::RuleService;
use serde_json::{json, Value};

pub struct Harness {
    pub service: RuleService<Arc<ScriptedTransport>>,
    pub transport: Arc<ScriptedTransport>,
    pub tracker: InFlightTracker,
    pub log: MemoryLog,
}

/// A service over a scripted transport with its own in-flight tracker
pub fn harness() -> Harness {
    let transport = Arc::new(ScriptedTransport::new());
    let tracker = InFlightTracker::new();
    let (logger, log) = Logger::memory();
    let interceptor = Interceptor::new(transport.clone())
        .with_tracker(tracker.clone())
        .with_logger(logger);
    Harness {
        service: RuleService::new(interceptor),
        transport,
        tracker,
        log,
    }
}

/// A well-formed rule as the backend returns it
pub fn rule_json(id: u64) -> Value {
    json!({
        "id": id,
        "ruleName": format!("rule-{}", id),
        "ruleContent": format!("rule \"r{}\" when then end", id),
        "description": "fixture",
        "enabled": id % 2 == 0,
        "createTime": "2024-05-01T08:00:00",
        "updateTime": "2024-05-02T08:00:00",
        "version": "1"
    })
}

/// A paged envelope payload around `content`
pub fn page_json(content: Vec<Value>, total_elements: u64, page: u64, size: u64) -> Value {
    let total_pages = (total_elements + size - 1) / size;
    json!({
        "content": content,
        "totalElements": total_elements,
        "totalPages": total_pages,
        "page": page,
        "size": size,
        "first": page == 1,
        "last": page == total_pages
    })
}
