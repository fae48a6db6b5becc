//! Adapter for external analytics events
//!
//! Analytics logs use whatever timestamp representation their producer prefers.
//! Everything is converted to epoch milliseconds here, before any comparison with
//! interaction timestamps happens.

use crate::error::{AnalysisError, MalformedRecordWarning, RecordStream};
use crate::types::ExternalEvent;
use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};

/// Naive datetime layouts accepted in addition to RFC 3339 (read as UTC)
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// External events that survived normalization, in input order
#[derive(Debug, Clone, Default)]
pub struct ExternalBatch {
    pub events: Vec<ExternalEvent>,
    pub warnings: Vec<MalformedRecordWarning>,
}

/// Adapter for converting analytics records to [`ExternalEvent`]s
pub struct ExternalEventAdapter;

impl ExternalEventAdapter {
    /// Parse a JSON string containing an array of analytics records
    pub fn parse_json(json: &str) -> Result<ExternalBatch, AnalysisError> {
        let value: Value = serde_json::from_str(json)?;
        Self::normalize(&value)
    }

    /// Normalize a list of analytics records
    pub fn normalize(raw: &Value) -> Result<ExternalBatch, AnalysisError> {
        let records = raw.as_array().ok_or_else(|| {
            AnalysisError::InvalidInput("external events must be a JSON array".to_string())
        })?;

        let mut batch = ExternalBatch::default();
        for (index, record) in records.iter().enumerate() {
            match normalize_record(record) {
                Ok(event) => batch.events.push(event),
                Err(reason) => batch.warnings.push(MalformedRecordWarning {
                    stream: RecordStream::External,
                    index,
                    reason,
                }),
            }
        }
        Ok(batch)
    }
}

fn normalize_record(record: &Value) -> Result<ExternalEvent, String> {
    let object = record
        .as_object()
        .ok_or("external record is not an object")?;

    let raw_timestamp = object.get("timestamp").ok_or("missing timestamp")?;
    let timestamp = parse_timestamp(raw_timestamp)
        .ok_or_else(|| format!("unrecognized timestamp {}", raw_timestamp))?;

    let kind = ["kind", "event", "name", "type"]
        .iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .ok_or("missing event kind")?
        .to_string();

    let attributes = ["attributes", "properties"]
        .iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_object))
        .next()
        .cloned()
        .unwrap_or_else(Map::new);

    Ok(ExternalEvent {
        timestamp,
        kind,
        attributes,
    })
}

/// Convert a timestamp in any supported representation to epoch milliseconds
pub fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| float_millis(n.as_f64()?)),
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<i64> {
    if s.is_empty() {
        return None;
    }
    if let Ok(ms) = s.parse::<i64>() {
        return Some(ms);
    }
    if let Ok(ms) = s.parse::<f64>() {
        return float_millis(ms);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|naive| naive.and_utc().timestamp_millis())
}

fn float_millis(ms: f64) -> Option<i64> {
    if ms.is_finite() && ms.abs() < i64::MAX as f64 {
        Some(ms.round() as i64)
    } else {
        None
    }
}
