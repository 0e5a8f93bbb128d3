//! Wire contract for the rule service
//!
//! Every response from the backend is wrapped in the fixed envelope
//! `{ success, data, message?, code?, timestamp? }`. Types in this module
//! carry structure only; runtime shape checks live in [`crate::guards`].

mod envelope;
mod execution;
mod rule;

pub use envelope::{FieldError, PagedEnvelope, ResponseEnvelope, ValidationResult};
pub use execution::{FiredRule, RuleFactConfig, TestOptions, TestResult, TestRuleRequest};
pub use rule::{DomainRule, RuleDraft, RuleQuery, RuleStatistics, SortOrder};
