//! Adapter for converting raw interaction records to normalized events
//!
//! Each record is mapped independently. A record that cannot be placed in time is
//! dropped; a record with a usable timestamp but an unreadable payload becomes an
//! `Unknown` event so that downstream ordering is preserved.

use crate::schema::raw_record::*;
use crate::types::{
    CustomDetails, ElementRef, ErrorDetails, EventDetails, InputDetails, MouseAction,
    MouseInteractionDetails, MouseMoveDetails, NavigateDetails, NormalizedEvent,
    PageMetaDetails, PointerSample, ScrollDetails,
};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Result of adapting one raw record
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// Mapped without loss
    Clean(NormalizedEvent),
    /// Mapped, but part of the record was discarded (possibly the whole payload)
    Recovered {
        event: NormalizedEvent,
        reason: String,
    },
    /// Unusable; nothing to place in the stream
    Dropped { reason: String },
}

/// Adapter for converting raw records to normalized events
pub struct RecordAdapter;

impl RecordAdapter {
    /// Adapt one raw record
    pub fn adapt(raw: &Value) -> RecordOutcome {
        let Some(object) = raw.as_object() else {
            return RecordOutcome::Dropped {
                reason: "record is not an object".to_string(),
            };
        };

        let Some(timestamp) = object.get("timestamp").and_then(Value::as_i64) else {
            return RecordOutcome::Dropped {
                reason: "missing or non-integer timestamp".to_string(),
            };
        };

        let record = match RawInteractionRecord::deserialize(raw) {
            Ok(record) => record,
            Err(e) => {
                return RecordOutcome::Recovered {
                    event: NormalizedEvent::unknown(timestamp),
                    reason: format!("unreadable record: {}", e),
                }
            }
        };

        let details = match map_details(&record) {
            Ok(details) => details,
            Err(reason) => {
                return RecordOutcome::Recovered {
                    event: NormalizedEvent::unknown(timestamp),
                    reason,
                }
            }
        };

        let mut event = NormalizedEvent::new(timestamp, details);
        event.url = event_url(&event.details);

        match record.data.get("element") {
            None | Some(Value::Null) => RecordOutcome::Clean(event),
            Some(element) => match ElementRef::deserialize(element) {
                Ok(element) => RecordOutcome::Clean(event.with_element(element)),
                Err(e) => RecordOutcome::Recovered {
                    event,
                    reason: format!("element discarded: {}", e),
                },
            },
        }
    }
}

/// URL carried by navigation-like events
fn event_url(details: &EventDetails) -> Option<String> {
    match details {
        EventDetails::Navigate(nav) => Some(nav.url.clone()),
        EventDetails::PageMeta(meta) => meta.href.clone(),
        _ => None,
    }
}

fn map_details(record: &RawInteractionRecord) -> Result<EventDetails, String> {
    let data = &record.data;
    match &record.record_type {
        RecordType::Meta => map_meta(data),
        RecordType::Custom => map_custom(data),
        RecordType::Incremental => map_incremental(data),
        RecordType::FullSnapshot | RecordType::DomContentLoaded | RecordType::Load => {
            Ok(EventDetails::Custom(CustomDetails {
                tag: record.record_type.name().to_string(),
                payload: None,
            }))
        }
        RecordType::Other(name) => Ok(EventDetails::Custom(CustomDetails {
            tag: format!("record:{}", name),
            payload: None,
        })),
    }
}

fn map_meta(data: &Value) -> Result<EventDetails, String> {
    let object = as_object(data, "meta")?;
    Ok(EventDetails::PageMeta(PageMetaDetails {
        href: string_field(object, &["href", "url"]),
        width: dimension(object, "width"),
        height: dimension(object, "height"),
        user_agent: string_field(object, &["userAgent", "user_agent"]),
    }))
}

fn map_custom(data: &Value) -> Result<EventDetails, String> {
    let object = as_object(data, "custom")?;
    let tag = string_field(object, &["tag"]).ok_or("custom record without tag")?;
    let payload = object.get("payload").filter(|p| !p.is_null());

    if NAVIGATION_TAGS.contains(&tag.as_str()) {
        let url = payload
            .and_then(Value::as_object)
            .and_then(|p| string_field(p, &["href", "url", "$current_url"]))
            .ok_or_else(|| format!("{} event without url", tag))?;
        return Ok(EventDetails::Navigate(NavigateDetails { url }));
    }

    if ERROR_TAGS.contains(&tag.as_str()) {
        let error = payload
            .and_then(error_details)
            .ok_or_else(|| format!("{} event without message", tag))?;
        return Ok(EventDetails::Error(error));
    }

    Ok(EventDetails::Custom(CustomDetails {
        tag,
        payload: payload.cloned(),
    }))
}

fn map_incremental(data: &Value) -> Result<EventDetails, String> {
    let object = as_object(data, "incremental")?;

    if let Some(error) = object.get("error").filter(|e| !e.is_null()) {
        return error_details(error)
            .map(EventDetails::Error)
            .ok_or_else(|| "error payload without message".to_string());
    }

    let source = object
        .get("source")
        .and_then(Value::as_u64)
        .map(IncrementalSource::from_code)
        .ok_or("incremental record without source")?;

    match source {
        IncrementalSource::MouseMove | IncrementalSource::TouchMove => {
            let positions = pointer_samples(object)?;
            Ok(EventDetails::MouseMove(MouseMoveDetails { positions }))
        }
        IncrementalSource::MouseInteraction => {
            let action = match object.get("type") {
                Some(Value::Number(n)) => n.as_u64().and_then(MouseAction::from_code),
                Some(Value::String(s)) => MouseAction::from_name(s),
                _ => None,
            }
            .ok_or("unknown mouse interaction type")?;
            Ok(EventDetails::MouseInteraction(MouseInteractionDetails {
                action,
                x: number(object, "x"),
                y: number(object, "y"),
                node_id: object.get("id").and_then(Value::as_i64),
            }))
        }
        IncrementalSource::Scroll => Ok(EventDetails::Scroll(ScrollDetails {
            x: number(object, "x").unwrap_or(0.0),
            y: number(object, "y").unwrap_or(0.0),
            node_id: object.get("id").and_then(Value::as_i64),
        })),
        IncrementalSource::ViewportResize => {
            let width = dimension(object, "width");
            let height = dimension(object, "height");
            if width.is_none() && height.is_none() {
                return Err("viewport resize without dimensions".to_string());
            }
            Ok(EventDetails::PageMeta(PageMetaDetails {
                width,
                height,
                ..PageMetaDetails::default()
            }))
        }
        IncrementalSource::Input => Ok(EventDetails::Input(InputDetails {
            text: object.get("text").and_then(Value::as_str).map(str::to_string),
            is_checked: object.get("isChecked").and_then(Value::as_bool),
            node_id: object.get("id").and_then(Value::as_i64),
        })),
        other => Ok(EventDetails::Custom(CustomDetails {
            tag: format!("incremental:{}", other.code()),
            payload: None,
        })),
    }
}

fn pointer_samples(object: &Map<String, Value>) -> Result<Vec<PointerSample>, String> {
    match object.get("positions") {
        Some(Value::Array(positions)) => Ok(positions
            .iter()
            .filter_map(Value::as_object)
            .map(|p| PointerSample {
                x: number(p, "x").unwrap_or(0.0),
                y: number(p, "y").unwrap_or(0.0),
                time_offset: p.get("timeOffset").and_then(Value::as_i64).unwrap_or(0),
            })
            .collect()),
        Some(_) => Err("mouse move positions is not a list".to_string()),
        None => match (number(object, "x"), number(object, "y")) {
            (Some(x), Some(y)) => Ok(vec![PointerSample {
                x,
                y,
                time_offset: 0,
            }]),
            _ => Err("mouse move without positions".to_string()),
        },
    }
}

/// Error payloads are either a bare message or `{ message, source?, stack? }`
fn error_details(value: &Value) -> Option<ErrorDetails> {
    match value {
        Value::String(message) if !message.is_empty() => Some(ErrorDetails {
            message: message.clone(),
            ..ErrorDetails::default()
        }),
        Value::Object(object) => {
            let message = string_field(object, &["message", "error", "$exception_message"])?;
            Some(ErrorDetails {
                message,
                source: string_field(object, &["source", "filename", "$exception_source"]),
                stack: string_field(object, &["stack", "$exception_stack_trace_raw"]),
            })
        }
        _ => None,
    }
}

fn as_object<'a>(data: &'a Value, what: &str) -> Result<&'a Map<String, Value>, String> {
    data.as_object()
        .ok_or_else(|| format!("{} record data is not an object", what))
}

/// First non-empty string among `keys`
fn string_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn number(object: &Map<String, Value>, key: &str) -> Option<f64> {
    object
        .get(key)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
}

fn dimension(object: &Map<String, Value>, key: &str) -> Option<u32> {
    number(object, key)
        .filter(|n| *n >= 0.0 && *n <= u32::MAX as f64)
        .map(|n| n.round() as u32)
}
