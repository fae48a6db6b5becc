//! Interaction stream normalization
//!
//! Maps a list of raw records to a time-ordered list of [`NormalizedEvent`]s and
//! collects the page defaults later used for session metadata.

use crate::error::{AnalysisError, MalformedRecordWarning, RecordStream};
use crate::logging::Logger;
use crate::schema::{RecordAdapter, RecordOutcome};
use crate::types::{EventDetails, NormalizedEvent};
use serde::Serialize;
use serde_json::Value;

/// Page-level defaults taken from the first page metadata in the session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDefaults {
    pub url: Option<String>,
    pub user_agent: Option<String>,
}

/// Output of one normalization run
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    /// Sorted ascending by timestamp, ties in input order
    pub events: Vec<NormalizedEvent>,
    pub defaults: PageDefaults,
    pub warnings: Vec<MalformedRecordWarning>,
}

/// Normalizer for raw interaction records
pub struct Normalizer;

impl Normalizer {
    /// Parse and normalize a JSON array of raw records
    pub fn normalize_json(
        json: &str,
        logger: &dyn Logger,
    ) -> Result<NormalizedBatch, AnalysisError> {
        let value: Value = serde_json::from_str(json)?;
        Self::normalize(&value, logger)
    }

    /// Normalize a list of raw records
    ///
    /// Fails only when `raw` is not a list. Individual bad records are mapped to
    /// `Unknown` events or dropped, and reported in [`NormalizedBatch::warnings`].
    pub fn normalize(raw: &Value, logger: &dyn Logger) -> Result<NormalizedBatch, AnalysisError> {
        let records = raw.as_array().ok_or_else(|| {
            AnalysisError::InvalidInput("interaction records must be a JSON array".to_string())
        })?;

        let mut events = Vec::with_capacity(records.len());
        let mut warnings = Vec::new();

        for (index, record) in records.iter().enumerate() {
            let reason = match RecordAdapter::adapt(record) {
                RecordOutcome::Clean(event) => {
                    events.push(event);
                    continue;
                }
                RecordOutcome::Recovered { event, reason } => {
                    events.push(event);
                    reason
                }
                RecordOutcome::Dropped { reason } => reason,
            };

            let warning = MalformedRecordWarning {
                stream: RecordStream::Interaction,
                index,
                reason,
            };
            logger.warn(&warning.to_string());
            warnings.push(warning);
        }

        // Stable: ties keep record order
        events.sort_by_key(|e| e.timestamp);

        let defaults = page_defaults(&events);

        logger.debug(&format!(
            "normalized {} records into {} events ({} warnings)",
            records.len(),
            events.len(),
            warnings.len()
        ));

        Ok(NormalizedBatch {
            events,
            defaults,
            warnings,
        })
    }
}

/// First page url and user agent seen in page metadata events
pub fn page_defaults(events: &[NormalizedEvent]) -> PageDefaults {
    let mut defaults = PageDefaults::default();
    for event in events {
        if let EventDetails::PageMeta(meta) = &event.details {
            if defaults.url.is_none() {
                defaults.url = meta.href.clone();
            }
            if defaults.user_agent.is_none() {
                defaults.user_agent = meta.user_agent.clone();
            }
        }
        if defaults.url.is_some() && defaults.user_agent.is_some() {
            break;
        }
    }
    defaults
}
