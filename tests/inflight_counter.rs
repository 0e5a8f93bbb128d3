//! In-Flight Counter Tests
//!
//! - The counter is positive while any tracked request is outstanding
//! - The counter returns to zero after every request settles, success or failure
//! - Requests marked `show-loading: false` are never counted

mod common;

use std::time::Duration;

use futures_util::future::join_all;
use ruledesk::errors::TransportFailure;
use ruledesk::transport::{TransportRequest, TransportResponse, SHOW_LOADING_HEADER};
use serde_json::json;

// =============================================================================
// Concurrency
// =============================================================================

/// Concurrent requests raise the count, and it settles back to zero.
#[tokio::test(start_paused = true)]
async fn test_concurrent_requests_settle_to_zero() {
    let h = common::harness();
    for i in 0..4u64 {
        h.transport.push_delayed(
            Ok(TransportResponse::json(json!({"success": true, "data": common::rule_json(i + 1)}))),
            Duration::from_millis(50 * (i + 1)),
        );
    }
    h.transport
        .push_delayed(Err(TransportFailure::status(500, None)), Duration::from_millis(120));

    let mut watcher = h.tracker.subscribe();
    let interceptor = h.service.interceptor();
    let calls = join_all((0..5).map(|_| interceptor.execute(TransportRequest::get("/rules/1"))));
    let observe = async {
        let mut peak = 0;
        while watcher.changed().await.is_ok() {
            let now = *watcher.borrow();
            peak = peak.max(now);
            if now == 0 {
                break;
            }
        }
        peak
    };

    let (results, peak) = tokio::join!(calls, observe);

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 4);
    assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    assert!(peak > 0);
    assert_eq!(h.tracker.count(), 0);
    assert!(!h.tracker.is_busy());
}

/// The count is visible mid-flight.
#[tokio::test(start_paused = true)]
async fn test_count_positive_mid_flight() {
    let h = common::harness();
    h.transport.push_delayed(
        Ok(TransportResponse::json(json!({"success": true, "data": null}))),
        Duration::from_millis(100),
    );
    h.transport.push_delayed(
        Ok(TransportResponse::json(json!({"success": true, "data": null}))),
        Duration::from_millis(100),
    );

    let interceptor = h.service.interceptor();
    let both = async {
        tokio::join!(
            interceptor.execute(TransportRequest::get("/rules")),
            interceptor.execute(TransportRequest::get("/rules")),
        )
    };
    let probe = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        h.tracker.count()
    };

    let ((a, b), mid) = tokio::join!(both, probe);

    assert!(a.is_ok() && b.is_ok());
    assert_eq!(mid, 2);
    assert_eq!(h.tracker.count(), 0);
}

// =============================================================================
// Opt-out
// =============================================================================

/// Requests that opt out are not counted and the header is stripped.
#[tokio::test(start_paused = true)]
async fn test_show_loading_false_not_counted() {
    let h = common::harness();
    h.transport.push_delayed(
        Ok(TransportResponse::json(json!({"success": true, "data": null}))),
        Duration::from_millis(100),
    );

    let interceptor = h.service.interceptor();
    let request = TransportRequest::get("/rules").header(SHOW_LOADING_HEADER, "false");
    let call = interceptor.execute(request);
    let probe = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        h.tracker.count()
    };

    let (result, mid) = tokio::join!(call, probe);

    assert!(result.is_ok());
    assert_eq!(mid, 0);
    let sent = h.transport.last_request().unwrap();
    assert!(sent.header_value(SHOW_LOADING_HEADER).is_none());
}

/// A failed request still releases its slot.
#[tokio::test]
async fn test_failure_releases_slot() {
    let h = common::harness();
    h.transport.push_failure(TransportFailure::timed_out());

    let result = h.service.get_rule(3).await;

    assert!(result.is_err());
    assert_eq!(h.tracker.count(), 0);
}
