//! Structured logging with component context.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use edge_core::LoggingConfig;
use serde::Serialize;

use crate::sink::DiagnosticSink;

/// Log level for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "TRACE"),
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Error returned when a level or format name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseSettingError {
    kind: &'static str,
    value: String,
}

impl FromStr for LogLevel {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ParseSettingError {
                kind: "log level",
                value: s.to_string(),
            }),
        }
    }
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON format (for production/log aggregation).
    #[default]
    Json,
    /// Human-readable format (for development).
    Human,
}

impl FromStr for LogFormat {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "human" | "text" => Ok(Self::Human),
            _ => Err(ParseSettingError {
                kind: "log format",
                value: s.to_string(),
            }),
        }
    }
}

/// A structured log entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// Log level.
    pub level: LogLevel,
    /// Log message.
    pub message: String,
    /// Component that produced the entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Additional structured fields.
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
    /// Microseconds since the logger was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_us: Option<u64>,
}

impl LogEntry {
    /// Create an entry with no fields.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            component: None,
            fields: BTreeMap::new(),
            elapsed_us: None,
        }
    }

    /// Look up a string field.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }

    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }

    /// Format as human-readable string.
    pub fn to_human(&self) -> String {
        let mut s = match &self.component {
            Some(component) => format!("[{}] {}: {}", self.level, component, self.message),
            None => format!("[{}] {}", self.level, self.message),
        };

        if let Some(elapsed) = self.elapsed_us {
            s.push_str(&format!(" ({}us)", elapsed));
        }

        if !self.fields.is_empty() {
            s.push_str(" | ");
            let fields: Vec<String> = self
                .fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            s.push_str(&fields.join(" "));
        }

        s
    }
}

/// Structured logger.
///
/// Stamps entries with the component name and elapsed time, drops entries
/// below the minimum level, and emits the formatted line as a `tracing`
/// event at the matching level.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    component: Option<String>,
    start_time: std::time::Instant,
    min_level: LogLevel,
    format: LogFormat,
}

impl StructuredLogger {
    /// Create a new logger.
    pub fn new() -> Self {
        Self {
            component: None,
            start_time: std::time::Instant::now(),
            min_level: LogLevel::Info,
            format: LogFormat::Json,
        }
    }

    /// Create a logger from the `[logging]` config section.
    pub fn from_config(config: &LoggingConfig) -> Result<Self, ParseSettingError> {
        Ok(Self::new()
            .with_min_level(config.level.parse()?)
            .with_format(config.format.parse()?))
    }

    /// Set the component name.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Set minimum log level.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Minimum level this logger emits.
    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Get elapsed time since logger creation.
    pub fn elapsed_us(&self) -> u64 {
        self.start_time.elapsed().as_micros() as u64
    }

    /// Fill in component and timing, then format. `None` when filtered out.
    pub fn render(&self, mut entry: LogEntry) -> Option<String> {
        if entry.level < self.min_level {
            return None;
        }
        if entry.component.is_none() {
            entry.component = self.component.clone();
        }
        entry.elapsed_us = Some(self.elapsed_us());

        Some(match self.format {
            LogFormat::Json => entry.to_json(),
            LogFormat::Human => entry.to_human(),
        })
    }
}

impl Default for StructuredLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticSink for StructuredLogger {
    fn record(&self, entry: LogEntry) {
        let level = entry.level;
        let Some(line) = self.render(entry) else {
            return;
        };

        match level {
            LogLevel::Trace => tracing::trace!("{}", line),
            LogLevel::Debug => tracing::debug!("{}", line),
            LogLevel::Info => tracing::info!("{}", line),
            LogLevel::Warn => tracing::warn!("{}", line),
            LogLevel::Error => tracing::error!("{}", line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("human".parse::<LogFormat>().unwrap(), LogFormat::Human);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_entry_to_json_flattens_fields() {
        let mut entry = LogEntry::new(LogLevel::Error, "Component loading error");
        entry
            .fields
            .insert("fragment".to_string(), serde_json::json!("a.html"));

        let json: serde_json::Value = serde_json::from_str(&entry.to_json()).unwrap();
        assert_eq!(json["level"], "error");
        assert_eq!(json["fragment"], "a.html");
        assert!(json.get("component").is_none());
    }

    #[test]
    fn test_entry_to_human() {
        let mut entry = LogEntry::new(LogLevel::Warn, "Target element not found");
        entry.component = Some("loader".to_string());
        entry
            .fields
            .insert("selector".to_string(), serde_json::json!("#x"));

        assert_eq!(
            entry.to_human(),
            "[WARN] loader: Target element not found | selector=\"#x\""
        );
    }

    #[test]
    fn test_render_filters_below_min_level() {
        let logger = StructuredLogger::new().with_min_level(LogLevel::Warn);
        assert!(logger.render(LogEntry::new(LogLevel::Info, "quiet")).is_none());
        assert!(logger.render(LogEntry::new(LogLevel::Error, "loud")).is_some());
    }

    #[test]
    fn test_render_stamps_component() {
        let logger = StructuredLogger::new()
            .with_component("component-loader")
            .with_format(LogFormat::Json);
        let line = logger.render(LogEntry::new(LogLevel::Info, "hi")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["component"], "component-loader");
        assert!(json["elapsed_us"].is_u64());
    }

    #[test]
    fn test_from_config() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: "human".to_string(),
        };
        let logger = StructuredLogger::from_config(&config).unwrap();
        assert_eq!(logger.min_level(), LogLevel::Debug);
    }
}
