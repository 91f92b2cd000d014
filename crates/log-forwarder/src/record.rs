// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Captured log records and their conversion into single-event batches.

use crate::constants::FALLBACK_STREAM_NAME;
use crate::sink::LogEvent;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A log record as handed over by the producer.
///
/// The payload is opaque to the forwarder; only the application alias is
/// inspected, to pick the destination stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Alias of the application that emitted the record. May be blank.
    #[serde(default)]
    pub application_alias: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl LogRecord {
    #[must_use]
    pub fn new(application_alias: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            application_alias: application_alias.into(),
            timestamp: now_millis(),
            level: None,
            source: None,
            payload,
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Destination stream: the trimmed alias, or [`FALLBACK_STREAM_NAME`] when blank.
    #[must_use]
    pub fn stream_name(&self) -> &str {
        let alias = self.application_alias.trim();
        if alias.is_empty() {
            FALLBACK_STREAM_NAME
        } else {
            alias
        }
    }

    /// Serializes the whole record as the message of a single log event.
    pub fn to_event(&self) -> Result<LogEvent, serde_json::Error> {
        Ok(LogEvent {
            message: serde_json::to_string(self)?,
            timestamp: self.timestamp,
        })
    }
}

pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stream_name_uses_alias() {
        let record = LogRecord::new("orders", json!({"msg": "hi"}));
        assert_eq!(record.stream_name(), "orders");
    }

    #[test]
    fn test_stream_name_trims_alias() {
        let record = LogRecord::new("  orders\t", json!(null));
        assert_eq!(record.stream_name(), "orders");
    }

    #[test]
    fn test_stream_name_fallback_for_blank_alias() {
        assert_eq!(LogRecord::new("", json!(null)).stream_name(), "Custom");
        assert_eq!(LogRecord::new("   ", json!(null)).stream_name(), "Custom");
    }

    #[test]
    fn test_to_event_keeps_timestamp_and_serializes_record() {
        let record = LogRecord::new("billing", json!({"msg": "paid"}))
            .with_timestamp(1_656_581_409_000)
            .with_level("Error");
        let event = record.to_event().unwrap();

        assert_eq!(event.timestamp, 1_656_581_409_000);
        let decoded: LogRecord = serde_json::from_str(&event.message).unwrap();
        assert_eq!(decoded, record);
        assert!(event.message.contains("\"level\":\"Error\""));
        assert!(!event.message.contains("\"source\""));
    }

    #[test]
    fn test_deserialize_with_missing_optional_fields() {
        let record: LogRecord =
            serde_json::from_str(r#"{"timestamp": 12, "payload": "text"}"#).unwrap();
        assert_eq!(record.application_alias, "");
        assert_eq!(record.stream_name(), "Custom");
        assert_eq!(record.payload, json!("text"));
    }
}
