//! Temporal join of moments with external analytics events
//!
//! Every moment picks up the external events that happened within the join
//! window around it, nearest first, each scored by how close it was.

use crate::config::DEFAULT_CORRELATION_WINDOW_MS;
use crate::types::{CorrelatedMoment, ExternalEvent, Moment, ScoredExternalEvent};

/// External events indexed by time for repeated window lookups
pub struct TemporalJoin {
    window_ms: i64,
    /// Ascending by timestamp, ties in input order
    events: Vec<ExternalEvent>,
}

impl TemporalJoin {
    /// A non-positive window falls back to the default
    pub fn new(external: &[ExternalEvent], window_ms: i64) -> Self {
        let mut events = external.to_vec();
        events.sort_by_key(|e| e.timestamp);
        Self {
            window_ms: if window_ms > 0 {
                window_ms
            } else {
                DEFAULT_CORRELATION_WINDOW_MS
            },
            events,
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// External events strictly closer than the window to `timestamp`, nearest first
    pub fn nearby(&self, timestamp: i64) -> Vec<ScoredExternalEvent> {
        let lower = timestamp.saturating_sub(self.window_ms);
        let upper = timestamp.saturating_add(self.window_ms);
        let start = self.events.partition_point(|e| e.timestamp <= lower);
        let end = self.events.partition_point(|e| e.timestamp < upper);

        let mut nearby: Vec<(i64, &ExternalEvent)> = self.events[start..end.max(start)]
            .iter()
            .map(|e| (e.timestamp.saturating_sub(timestamp).saturating_abs(), e))
            .collect();
        // Stable: equal distances keep time order
        nearby.sort_by_key(|(distance, _)| *distance);

        nearby
            .into_iter()
            .map(|(distance, event)| ScoredExternalEvent {
                event: event.clone(),
                relevance_score: relevance(distance, self.window_ms),
            })
            .collect()
    }

    pub fn attach(&self, moment: Moment) -> CorrelatedMoment {
        CorrelatedMoment {
            nearby_external_events: self.nearby(moment.timestamp),
            moment,
        }
    }
}

/// Join every moment with its nearby external events
pub fn correlate(
    moments: &[Moment],
    external: &[ExternalEvent],
    window_ms: i64,
) -> Vec<CorrelatedMoment> {
    let join = TemporalJoin::new(external, window_ms);
    moments.iter().cloned().map(|m| join.attach(m)).collect()
}

/// `1 - distance / window`, clamped to [0, 1] and rounded to 2 decimals
pub fn relevance(distance: i64, window_ms: i64) -> f64 {
    let score = (1.0 - distance as f64 / window_ms as f64).clamp(0.0, 1.0);
    (score * 100.0).round() / 100.0
}
