//! JSON output for the CLI
//!
//! - One JSON object per invocation on stdout
//! - UTF-8 only

use std::io::{self, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_value(&json!({
        "status": "ok",
        "data": data
    }))
}

/// Write an error response to stdout
pub fn write_error(err: &CliError) -> CliResult<()> {
    write_value(&error_body(err))
}

fn error_body(err: &CliError) -> Value {
    match err {
        CliError::Api(api) => json!({
            "status": "error",
            "kind": api.kind().as_str(),
            "code": api.code(),
            "message": api.display_message(),
            "details": api.details(),
        }),
        other => json!({
            "status": "error",
            "code": other.code_str(),
            "message": other.to_string(),
        }),
    }
}

fn write_value(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
