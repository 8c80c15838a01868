//! Diagnostics for the edge component loader.
//!
//! This crate provides:
//! - `DiagnosticSink` - Injected capability that receives log entries
//! - `StructuredLogger` - Sink that formats entries and emits them through `tracing`
//! - `RecordingSink` - Sink that keeps entries in memory for assertions
//! - `LogBuilder` - Fluent builder for entries with structured fields

mod logging;
mod sink;

pub use logging::*;
pub use sink::*;
