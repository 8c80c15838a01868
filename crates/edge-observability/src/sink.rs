//! Diagnostic sinks.

use std::cell::RefCell;
use std::rc::Rc;

use crate::logging::{LogEntry, LogLevel};

/// Receives diagnostics produced by the loader and its consumers.
pub trait DiagnosticSink {
    /// Record a log entry.
    fn record(&self, entry: LogEntry);

    /// Log at debug level.
    fn debug(&self, message: &str) {
        self.record(LogEntry::new(LogLevel::Debug, message));
    }

    /// Log at info level.
    fn info(&self, message: &str) {
        self.record(LogEntry::new(LogLevel::Info, message));
    }

    /// Log at warn level.
    fn warn(&self, message: &str) {
        self.record(LogEntry::new(LogLevel::Warn, message));
    }

    /// Log at error level.
    fn error(&self, message: &str) {
        self.record(LogEntry::new(LogLevel::Error, message));
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Rc<S> {
    fn record(&self, entry: LogEntry) {
        (**self).record(entry);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn record(&self, entry: LogEntry) {
        (**self).record(entry);
    }
}

/// Sink that keeps every entry in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: RefCell<Vec<LogEntry>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    /// Entries at exactly the given level.
    pub fn at_level(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    /// Warn-level entries.
    pub fn warnings(&self) -> Vec<LogEntry> {
        self.at_level(LogLevel::Warn)
    }

    /// Error-level entries.
    pub fn errors(&self) -> Vec<LogEntry> {
        self.at_level(LogLevel::Error)
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Drop all recorded entries.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn record(&self, entry: LogEntry) {
        self.entries.borrow_mut().push(entry);
    }
}

/// Builder for log entries with fluent API.
pub struct LogBuilder<'a> {
    sink: &'a dyn DiagnosticSink,
    entry: LogEntry,
}

impl<'a> LogBuilder<'a> {
    /// Create a new log builder.
    pub fn new(sink: &'a dyn DiagnosticSink, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            sink,
            entry: LogEntry::new(level, message),
        }
    }

    /// Start building an info entry.
    pub fn info(sink: &'a dyn DiagnosticSink, message: impl Into<String>) -> Self {
        Self::new(sink, LogLevel::Info, message)
    }

    /// Start building a warn entry.
    pub fn warn(sink: &'a dyn DiagnosticSink, message: impl Into<String>) -> Self {
        Self::new(sink, LogLevel::Warn, message)
    }

    /// Start building an error entry.
    pub fn error(sink: &'a dyn DiagnosticSink, message: impl Into<String>) -> Self {
        Self::new(sink, LogLevel::Error, message)
    }

    /// Set the component name.
    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.entry.component = Some(component.into());
        self
    }

    /// Add a string field.
    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entry
            .fields
            .insert(key.to_string(), serde_json::json!(value.into()));
        self
    }

    /// Add an integer field.
    pub fn field_i64(mut self, key: &str, value: i64) -> Self {
        self.entry
            .fields
            .insert(key.to_string(), serde_json::json!(value));
        self
    }

    /// Add a boolean field.
    pub fn field_bool(mut self, key: &str, value: bool) -> Self {
        self.entry
            .fields
            .insert(key.to_string(), serde_json::json!(value));
        self
    }

    /// Add a duration field (in milliseconds).
    pub fn duration_ms(mut self, key: &str, duration: std::time::Duration) -> Self {
        self.entry
            .fields
            .insert(key.to_string(), serde_json::json!(duration.as_millis() as u64));
        self
    }

    /// Emit the log entry.
    pub fn emit(self) {
        self.sink.record(self.entry);
    }
}
