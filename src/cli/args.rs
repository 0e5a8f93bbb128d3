//! CLI argument definitions using clap
//!
//! Every command prints one JSON object on stdout.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::model::SortOrder;

/// ruledesk - client for the rule-definition service
#[derive(Parser, Debug)]
#[command(name = "ruledesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection settings shared by every command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Path to a JSON configuration file (default: environment presets)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, global = true, env = "RULEDESK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Override the number of attempts for read commands
    #[arg(long, global = true)]
    pub retries: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all rules
    List {
        /// Only rules with this status
        #[arg(long)]
        enabled: Option<bool>,
        /// Only rules matching this keyword
        #[arg(long)]
        keyword: Option<String>,
    },

    /// List one page of rules
    Page {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Page size (default: configured default)
        #[arg(long)]
        size: Option<u64>,
        /// Sort field
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, value_enum)]
        order: Option<OrderArg>,
        /// Filter by rule name
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        enabled: Option<bool>,
        /// Created at or after this timestamp
        #[arg(long)]
        from: Option<String>,
        /// Created at or before this timestamp
        #[arg(long)]
        to: Option<String>,
    },

    /// Search rules by keyword
    Search { keyword: String },

    /// Fetch one rule
    Get { id: u64 },

    /// Create a rule
    Create {
        #[command(flatten)]
        rule: RuleArgs,
    },

    /// Replace a rule
    Update {
        id: u64,
        #[command(flatten)]
        rule: RuleArgs,
        /// Version the update is based on
        #[arg(long)]
        version: Option<String>,
    },

    /// Delete one rule
    Delete { id: u64 },

    /// Delete several rules
    DeleteMany {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<u64>,
    },

    /// Enable a rule
    Enable { id: u64 },

    /// Disable a rule
    Disable { id: u64 },

    /// Ask the server to compile a rule file
    Validate { file: PathBuf },

    /// Execute rules against test facts
    Test {
        /// Stored rules to execute
        #[arg(long, value_delimiter = ',')]
        ids: Vec<u64>,
        /// Unsaved rule body to execute
        #[arg(long)]
        content_file: Option<PathBuf>,
        /// JSON object with the test facts
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long)]
        verbose: bool,
    },

    /// Show rule counters
    Stats,

    /// Export rules
    Export {
        /// Rules to export (default: all)
        #[arg(long, value_delimiter = ',')]
        ids: Vec<u64>,
        /// Write the export here instead of inlining it
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Import a rule file
    Import { file: PathBuf },

    /// Run the local advisory checks only; never contacts the server
    Check {
        #[command(flatten)]
        rule: RuleArgs,
    },
}

/// Rule fields given on the command line
#[derive(clap::Args, Debug, Clone)]
pub struct RuleArgs {
    #[arg(long)]
    pub name: String,
    /// File holding the rule body
    #[arg(long)]
    pub content_file: PathBuf,
    #[arg(long)]
    pub description: Option<String>,
    /// Store the rule disabled
    #[arg(long)]
    pub disabled: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_after_subcommand() {
        let cli = Cli::try_parse_from(["ruledesk", "get", "7", "--base-url", "http://x/api"]).unwrap();
        assert!(matches!(cli.command, Command::Get { id: 7 }));
        assert_eq!(cli.options.base_url.as_deref(), Some("http://x/api"));
    }

    #[test]
    fn test_parse_id_lists() {
        let cli = Cli::try_parse_from(["ruledesk", "export", "--ids", "1,2,3"]).unwrap();
        match cli.command {
            Command::Export { ids, output } => {
                assert_eq!(ids, vec![1, 2, 3]);
                assert!(output.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Cli::try_parse_from(["ruledesk", "delete-many"]).is_err());
    }

    #[test]
    fn test_parse_page() {
        let cli = Cli::try_parse_from(["ruledesk", "page", "--size", "50", "--order", "desc"]).unwrap();
        match cli.command {
            Command::Page { page, size, order, .. } => {
                assert_eq!(page, 1);
                assert_eq!(size, Some(50));
                assert_eq!(order, Some(OrderArg::Desc));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
