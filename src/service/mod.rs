//! # Rule service
//!
//! Domain operations over the rule-definition backend, plus the local
//! advisory validators.
//!
//! Every operation follows one template: check local arguments, send the
//! request through the interceptor, guard the envelope, require `success`,
//! then guard the payload (dropping malformed collection items).

pub mod endpoints;
mod rules;
pub mod validation;

pub use rules::RuleService;
pub use validation::{
    is_valid_timestamp, validate_description, validate_import_file, validate_rule,
    validate_rule_content, validate_rule_name, validate_test_request,
};
