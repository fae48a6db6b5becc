//! Error types for Friction Lens

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during session analysis
///
/// Only structurally invalid input is fatal. Problems with individual records are
/// reported as [`MalformedRecordWarning`] values instead.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse payload: {0}")]
    ParseError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

/// Input stream a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStream {
    Interaction,
    External,
}

/// A single record that could not be used as-is
///
/// The record was either mapped to an `Unknown` event or dropped; the batch it
/// belongs to still succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedRecordWarning {
    pub stream: RecordStream,
    /// Position of the record in its input list
    pub index: usize,
    pub reason: String,
}

impl std::fmt::Display for MalformedRecordWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stream = match self.stream {
            RecordStream::Interaction => "interaction",
            RecordStream::External => "external",
        };
        write!(f, "{} record #{}: {}", stream, self.index, self.reason)
    }
}
