//! Operator-facing log stream.
//!
//! Every entry is printed as it is logged and broadcast to subscribers, so a
//! wrapper process (or a test) can tap the same lines the operator sees.
//! The lines are presentational; nothing should parse them.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Log level of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Optional indentation level (for nested logs)
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// The line as printed to the terminal.
    pub fn render(&self) -> String {
        let indent = "  ".repeat(self.indent as usize);
        match self.level {
            LogLevel::Info => format!("{}{}", indent, self.message),
            LogLevel::Success => format!("{}✓ {}", indent, self.message),
            LogLevel::Warning => format!("{}WARNING: {}", indent, self.message),
            LogLevel::Error => format!("{}ERROR: {}", indent, self.message),
        }
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Prints log entries and broadcasts them to all subscribers
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1024);
        Self { sender }
    }

    /// Print an entry to stderr and send it to all subscribers
    pub fn log(&self, entry: LogEntry) {
        // stdout is reserved for command output
        eprintln!("{}", entry.render());

        // No receivers is the normal case for the CLI
        let _ = self.sender.send(entry);
    }

    /// Get a receiver for the stream
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::error(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOG_BROADCASTER.log(LogEntry::info(msg).with_indent(indent));
}

/// Drain everything currently buffered in a receiver.
pub fn drain(receiver: &mut broadcast::Receiver<LogEntry>) -> Vec<LogEntry> {
    let mut entries = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(entry) => entries.push(entry),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    entries
}
