//! Raw interaction record definition
//!
//! Recorders emit a flat list of `{ type, timestamp, data }` records. The `type`
//! selects the payload shape; incremental records are further dispatched on
//! `data.source`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current raw record format
pub const RECORD_FORMAT: &str = "interaction.record.v1";

/// Top-level record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecordTypeRepr", into = "RecordTypeRepr")]
pub enum RecordType {
    DomContentLoaded,
    Load,
    FullSnapshot,
    Incremental,
    Meta,
    Custom,
    /// Any code or name this crate does not interpret
    Other(String),
}

impl RecordType {
    pub fn code(&self) -> Option<u64> {
        match self {
            RecordType::DomContentLoaded => Some(0),
            RecordType::Load => Some(1),
            RecordType::FullSnapshot => Some(2),
            RecordType::Incremental => Some(3),
            RecordType::Meta => Some(4),
            RecordType::Custom => Some(5),
            RecordType::Other(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RecordType::DomContentLoaded => "dom_content_loaded",
            RecordType::Load => "load",
            RecordType::FullSnapshot => "full_snapshot",
            RecordType::Incremental => "incremental",
            RecordType::Meta => "meta",
            RecordType::Custom => "custom",
            RecordType::Other(name) => name.as_str(),
        }
    }
}

/// Wire representation: numeric code or lowercase name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RecordTypeRepr {
    Code(u64),
    Name(String),
}

impl From<RecordTypeRepr> for RecordType {
    fn from(repr: RecordTypeRepr) -> Self {
        match repr {
            RecordTypeRepr::Code(0) => RecordType::DomContentLoaded,
            RecordTypeRepr::Code(1) => RecordType::Load,
            RecordTypeRepr::Code(2) => RecordType::FullSnapshot,
            RecordTypeRepr::Code(3) => RecordType::Incremental,
            RecordTypeRepr::Code(4) => RecordType::Meta,
            RecordTypeRepr::Code(5) => RecordType::Custom,
            RecordTypeRepr::Code(other) => RecordType::Other(other.to_string()),
            RecordTypeRepr::Name(name) => match name.to_ascii_lowercase().as_str() {
                "dom_content_loaded" | "domcontentloaded" => RecordType::DomContentLoaded,
                "load" => RecordType::Load,
                "full_snapshot" | "fullsnapshot" => RecordType::FullSnapshot,
                "incremental" | "incremental_snapshot" | "incrementalsnapshot" => {
                    RecordType::Incremental
                }
                "meta" => RecordType::Meta,
                "custom" => RecordType::Custom,
                _ => RecordType::Other(name),
            },
        }
    }
}

impl From<RecordType> for RecordTypeRepr {
    fn from(record_type: RecordType) -> Self {
        match record_type.code() {
            Some(code) => RecordTypeRepr::Code(code),
            None => RecordTypeRepr::Name(record_type.name().to_string()),
        }
    }
}

/// Source of an incremental record (`data.source`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementalSource {
    Mutation,
    MouseMove,
    MouseInteraction,
    Scroll,
    ViewportResize,
    Input,
    TouchMove,
    MediaInteraction,
    StyleSheetRule,
    CanvasMutation,
    Font,
    Log,
    Drag,
    Other(u64),
}

impl IncrementalSource {
    pub fn from_code(code: u64) -> Self {
        match code {
            0 => IncrementalSource::Mutation,
            1 => IncrementalSource::MouseMove,
            2 => IncrementalSource::MouseInteraction,
            3 => IncrementalSource::Scroll,
            4 => IncrementalSource::ViewportResize,
            5 => IncrementalSource::Input,
            6 => IncrementalSource::TouchMove,
            7 => IncrementalSource::MediaInteraction,
            8 => IncrementalSource::StyleSheetRule,
            9 => IncrementalSource::CanvasMutation,
            10 => IncrementalSource::Font,
            11 => IncrementalSource::Log,
            12 => IncrementalSource::Drag,
            other => IncrementalSource::Other(other),
        }
    }

    pub fn code(&self) -> u64 {
        match self {
            IncrementalSource::Mutation => 0,
            IncrementalSource::MouseMove => 1,
            IncrementalSource::MouseInteraction => 2,
            IncrementalSource::Scroll => 3,
            IncrementalSource::ViewportResize => 4,
            IncrementalSource::Input => 5,
            IncrementalSource::TouchMove => 6,
            IncrementalSource::MediaInteraction => 7,
            IncrementalSource::StyleSheetRule => 8,
            IncrementalSource::CanvasMutation => 9,
            IncrementalSource::Font => 10,
            IncrementalSource::Log => 11,
            IncrementalSource::Drag => 12,
            IncrementalSource::Other(code) => *code,
        }
    }
}

/// Custom tags that announce a page navigation
pub const NAVIGATION_TAGS: [&str; 4] = ["$pageview", "pageview", "navigation", "navigate"];

/// Custom tags that carry a script error
pub const ERROR_TAGS: [&str; 3] = ["error", "$exception", "console_error"];

/// A raw record as produced by the recorder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInteractionRecord {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Epoch milliseconds
    pub timestamp: i64,
    #[serde(default)]
    pub data: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_from_code_and_name() {
        let by_code: RecordType = serde_json::from_str("3").unwrap();
        assert_eq!(by_code, RecordType::Incremental);

        let by_name: RecordType = serde_json::from_str("\"Meta\"").unwrap();
        assert_eq!(by_name, RecordType::Meta);

        let other: RecordType = serde_json::from_str("42").unwrap();
        assert_eq!(other, RecordType::Other("42".to_string()));
    }

    #[test]
    fn test_record_type_serializes_as_code() {
        assert_eq!(serde_json::to_string(&RecordType::Custom).unwrap(), "5");
        assert_eq!(
            serde_json::to_string(&RecordType::Other("plugin".to_string())).unwrap(),
            "\"plugin\""
        );
    }

    #[test]
    fn test_raw_record_deserialization() {
        let json = r#"{"type": 4, "timestamp": 1700000000000, "data": {"href": "https://a.test"}}"#;
        let record: RawInteractionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.record_type, RecordType::Meta);
        assert_eq!(record.timestamp, 1_700_000_000_000);
        assert_eq!(record.data["href"], "https://a.test");
    }

    #[test]
    fn test_incremental_source_codes() {
        assert_eq!(IncrementalSource::from_code(2), IncrementalSource::MouseInteraction);
        assert_eq!(IncrementalSource::from_code(99), IncrementalSource::Other(99));
        assert_eq!(IncrementalSource::Scroll.code(), 3);
    }
}
