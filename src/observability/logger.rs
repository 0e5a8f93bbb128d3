//! Structured JSON logger
//!
//! Every line is a JSON object: `event` first, then `severity`, then `ts`,
//! then caller fields sorted by key.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Trace = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where log lines go
#[derive(Debug, Clone)]
pub enum LogSink {
    /// stdout, with `Error` on stderr
    Console,
    /// Everything on stderr
    Stderr,
    /// In-memory buffer, for tests and embedding
    Memory(MemoryLog),
    /// Drop everything
    Disabled,
}

/// Shared in-memory log buffer
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, line: String) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(line);
    }

    /// All captured lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Captured lines parsed back into JSON objects
    pub fn entries(&self) -> Vec<serde_json::Value> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// Captured entries with the given event name
    pub fn events(&self, event: &str) -> Vec<serde_json::Value> {
        self.entries()
            .into_iter()
            .filter(|entry| entry["event"] == event)
            .collect()
    }
}

/// A structured logger that outputs JSON lines.
///
/// Cheap to clone; clones share the sink.
#[derive(Debug, Clone)]
pub struct Logger {
    min_severity: Severity,
    sink: LogSink,
}

impl Default for Logger {
    fn default() -> Self {
        Self::console(Severity::Info)
    }
}

impl Logger {
    /// Log to the console at or above `min_severity`
    pub fn console(min_severity: Severity) -> Self {
        Self {
            min_severity,
            sink: LogSink::Console,
        }
    }

    /// Log everything to stderr, keeping stdout free for command output
    pub fn stderr(min_severity: Severity) -> Self {
        Self {
            min_severity,
            sink: LogSink::Stderr,
        }
    }

    /// Capture every line in memory
    pub fn memory() -> (Self, MemoryLog) {
        let log = MemoryLog::new();
        let logger = Self {
            min_severity: Severity::Trace,
            sink: LogSink::Memory(log.clone()),
        };
        (logger, log)
    }

    /// A logger that drops everything
    pub fn disabled() -> Self {
        Self {
            min_severity: Severity::Error,
            sink: LogSink::Disabled,
        }
    }

    /// Whether `severity` would be emitted
    pub fn enabled(&self, severity: Severity) -> bool {
        !matches!(self.sink, LogSink::Disabled) && severity >= self.min_severity
    }

    /// Log an event with the given severity and fields
    pub fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !self.enabled(severity) {
            return;
        }
        let line = render(severity, event, fields);
        match &self.sink {
            LogSink::Console if severity >= Severity::Error => write_line(&mut io::stderr(), &line),
            LogSink::Console => write_line(&mut io::stdout(), &line),
            LogSink::Stderr => write_line(&mut io::stderr(), &line),
            LogSink::Memory(log) => log.push(line),
            LogSink::Disabled => {}
        }
    }

    pub fn trace(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Trace, event, fields);
    }

    pub fn info(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Info, event, fields);
    }

    pub fn warn(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Warn, event, fields);
    }

    pub fn error(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Error, event, fields);
    }
}

/// Render one log line (without the trailing newline)
fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(256);
    output.push_str("{\"event\":");
    output.push_str(&quote(event));
    output.push_str(",\"severity\":");
    output.push_str(&quote(severity.as_str()));
    output.push_str(",\"ts\":");
    output.push_str(&quote(&Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)));

    let sorted: BTreeMap<&str, &str> = fields
        .iter()
        .filter(|(key, _)| !matches!(*key, "event" | "severity" | "ts"))
        .copied()
        .collect();
    for (key, value) in sorted {
        output.push(',');
        output.push_str(&quote(key));
        output.push(':');
        output.push_str(&quote(value));
    }
    output.push('}');
    output
}

fn quote(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

fn write_line<W: Write>(writer: &mut W, line: &str) {
    // Logging must never fail the caller
    let _ = writeln!(writer, "{}", line);
    let _ = writer.flush();
}
