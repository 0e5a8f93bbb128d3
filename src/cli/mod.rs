//! CLI module for ruledesk
//!
//! One command per rule-service operation, plus `check` for the local
//! advisory validators.

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, GlobalOptions, OrderArg, RuleArgs};
pub use commands::{load_config, run, run_command};
pub use errors::{CliError, CliResult};
pub use io::{write_error, write_response};
