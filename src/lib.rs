//! ruledesk - a strict, resilient API client for a rule-definition service
//!
//! Turns a loosely-typed HTTP/JSON boundary into typed results:
//! every operation returns either a guarded domain value or one
//! normalized [`errors::StandardError`].

pub mod cli;
pub mod config;
pub mod errors;
pub mod guards;
pub mod model;
pub mod observability;
pub mod retry;
pub mod service;
pub mod transport;

pub use errors::{ApiResult, ErrorKind, StandardError};
pub use service::RuleService;
