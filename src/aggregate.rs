//! Session-level moments
//!
//! Computed once the pattern pass is over: a short-session flag for visits that
//! ended almost immediately, and the session metrics baseline that every session
//! gets, quiet or not.

use crate::detectors::MomentSink;
use crate::types::{EventDetails, Pattern, Session, SessionMetrics};

/// Sessions shorter than this are flagged
pub const SHORT_SESSION_MS: i64 = 10_000;
/// ...unless they visited more pages than this
pub const SHORT_SESSION_MAX_PAGES: u32 = 2;

/// Aggregator for whole-session statistics
pub struct SessionAggregator;

impl SessionAggregator {
    /// Count interactions by kind
    pub fn metrics(session: &Session) -> SessionMetrics {
        let mut metrics = SessionMetrics {
            event_count: session.events.len() as u32,
            duration: session.metadata.duration,
            ..SessionMetrics::default()
        };

        for event in &session.events {
            match &event.details {
                EventDetails::MouseInteraction(_) if event.is_click() => metrics.click_count += 1,
                EventDetails::Input(_) => metrics.input_count += 1,
                EventDetails::Scroll(_) => metrics.scroll_count += 1,
                EventDetails::Navigate(_) => metrics.pageview_count += 1,
                EventDetails::Error(_) => metrics.error_count += 1,
                _ => {}
            }
        }

        metrics
    }

    /// Append the session-level moments to `sink`
    pub fn summarize(session: &Session, sink: &mut MomentSink<'_>) {
        let metrics = Self::metrics(session);
        let metadata = &session.metadata;

        if !session.events.is_empty()
            && metadata.duration < SHORT_SESSION_MS
            && metrics.pageview_count <= SHORT_SESSION_MAX_PAGES
        {
            sink.emit_at(
                metadata.start_time,
                Pattern::ShortSession {
                    duration_ms: metadata.duration,
                    page_count: metrics.pageview_count,
                },
            );
        }

        sink.emit_at(metadata.end_time, Pattern::SessionMetrics(metrics));
    }
}
