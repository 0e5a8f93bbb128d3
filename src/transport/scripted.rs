//! Scripted in-memory transport

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;

use super::request::{TransportRequest, TransportResponse};
use super::{Transport, TransportFuture};
use crate::errors::TransportFailure;

type Outcome = Result<TransportResponse, TransportFailure>;

/// Replays queued outcomes in order and records every request it receives.
///
/// Once the script is exhausted every call fails with a network error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<(Outcome, Option<Duration>)>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome
    pub fn push(&self, outcome: Outcome) {
        self.enqueue(outcome, None);
    }

    /// Queue an outcome delivered after `delay`
    pub fn push_delayed(&self, outcome: Outcome, delay: Duration) {
        self.enqueue(outcome, Some(delay));
    }

    /// Queue a 200 response with a JSON body
    pub fn push_ok(&self, body: Value) {
        self.push(Ok(TransportResponse::json(body)));
    }

    /// Queue a successful envelope around `data`
    pub fn push_envelope(&self, data: Value) {
        self.push_ok(serde_json::json!({"success": true, "data": data}));
    }

    pub fn push_failure(&self, failure: TransportFailure) {
        self.push(Err(failure));
    }

    fn enqueue(&self, outcome: Outcome, delay: Option<Duration>) {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back((outcome, delay));
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last_request(&self) -> Option<TransportRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .last()
            .cloned()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Outcomes not yet consumed
    pub fn remaining(&self) -> usize {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl Transport for ScriptedTransport {
    fn send<'a>(&'a self, request: TransportRequest) -> TransportFuture<'a> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request);
        let next = self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();

        Box::pin(async move {
            match next {
                Some((outcome, delay)) => {
                    if let Some(delay) = delay {
                        tokio::time::sleep(delay).await;
                    }
                    outcome
                }
                None => Err(TransportFailure::network(None, "no scripted response left")),
            }
        })
    }
}
