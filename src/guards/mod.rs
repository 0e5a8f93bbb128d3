//! # Type guards
//!
//! Structural checks applied to every payload the server returns before it
//! is trusted as a typed value.
//!
//! Guards never panic and never mutate their input. Each returns a
//! [`Checked`] that either holds the typed value or the list of reasons the
//! payload was rejected.

mod checked;
mod envelope;
mod inspect;
mod rule;

pub use checked::{rejection, Checked, INVALID_RESPONSE_MESSAGE};
pub(crate) use inspect::json_type_name;
pub use envelope::{paged_envelope, response_envelope};
pub use rule::{
    domain_rule, filter_valid, is_valid_id, rule_statistics, test_result, validation_result,
};
