//! ruledesk CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`, which prints the
//! JSON result. Exits non-zero on failure.

use ruledesk::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
