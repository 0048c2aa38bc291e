//! Structured asynchronous logging.
//!
//! Log producers enqueue [`LogEvent`]s through the [`Logger`] trait; the
//! [`AsyncJsonLogger`] drains the bounded queue on a dedicated writer thread
//! and emits newline-delimited JSON. Enqueueing never blocks beyond a short
//! mutex acquisition, so the feed loop stays responsive under log pressure.

mod async_logger;
mod queue;

pub use async_logger::{AsyncJsonLogger, AsyncJsonLoggerOptions};

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Log severity levels in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Queue overflow policy for the bounded log queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// Evict the head of the queue and enqueue the new event.
    DropOldest,
    /// Reject the incoming event.
    DropNewest,
}

/// Supported value types for structured log fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    StrList(Vec<String>),
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Str(value) => serializer.serialize_str(value),
            FieldValue::Int(value) => serializer.serialize_i64(*value),
            FieldValue::UInt(value) => serializer.serialize_u64(*value),
            FieldValue::Float(value) => serializer.serialize_f64(*value),
            FieldValue::Bool(value) => serializer.serialize_bool(*value),
            FieldValue::StrList(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}

/// Ordered set of structured fields attached to a log event.
///
/// Fields serialize as a JSON object in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogFields {
    entries: Vec<(String, FieldValue)>,
}

impl LogFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), FieldValue::Str(value.into())));
    }

    pub fn add_int(&mut self, key: impl Into<String>, value: i64) {
        self.entries.push((key.into(), FieldValue::Int(value)));
    }

    pub fn add_uint(&mut self, key: impl Into<String>, value: u64) {
        self.entries.push((key.into(), FieldValue::UInt(value)));
    }

    pub fn add_float(&mut self, key: impl Into<String>, value: f64) {
        self.entries.push((key.into(), FieldValue::Float(value)));
    }

    pub fn add_bool(&mut self, key: impl Into<String>, value: bool) {
        self.entries.push((key.into(), FieldValue::Bool(value)));
    }

    pub fn add_str_list(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.entries.push((key.into(), FieldValue::StrList(values)));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, FieldValue)] {
        &self.entries
    }
}

impl Serialize for LogFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A single structured log event.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    /// Milliseconds since the Unix epoch; 0 means "stamp at enqueue".
    pub ts_ms: u64,
    pub level: LogLevel,
    pub component: String,
    pub message: String,
    pub fields: LogFields,
    /// Raw payload attached verbatim (escaped on output).
    pub raw: Option<String>,
}

/// Sink interface for log events.
pub trait Logger: Send + Sync {
    /// Enqueue a prebuilt event.
    fn log_event(&self, event: LogEvent);

    /// Current minimum level for emission.
    fn level(&self) -> LogLevel;

    /// Log a message without fields.
    fn log(&self, level: LogLevel, component: &str, message: &str) {
        self.log_event(LogEvent {
            ts_ms: 0,
            level,
            component: component.to_string(),
            message: message.to_string(),
            fields: LogFields::new(),
            raw: None,
        });
    }

    /// Log a message with structured fields.
    fn log_with(&self, level: LogLevel, component: &str, message: &str, fields: LogFields) {
        self.log_event(LogEvent {
            ts_ms: 0,
            level,
            component: component.to_string(),
            message: message.to_string(),
            fields,
            raw: None,
        });
    }

    /// Log a message with an attached raw payload.
    fn log_raw(
        &self,
        level: LogLevel,
        component: &str,
        message: &str,
        fields: LogFields,
        raw: String,
    ) {
        self.log_event(LogEvent {
            ts_ms: 0,
            level,
            component: component.to_string(),
            message: message.to_string(),
            fields,
            raw: Some(raw),
        });
    }
}
