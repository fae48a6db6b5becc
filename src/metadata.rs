//! Session metadata derivation

use crate::normalizer::page_defaults;
use crate::types::{EventDetails, NormalizedEvent, SessionMetadata};

/// Build start/end/duration/url/user agent for a session's events
///
/// `events` must already be sorted. An empty list yields all-zero times and empty
/// strings.
pub fn build_metadata(events: &[NormalizedEvent]) -> SessionMetadata {
    let (start_time, end_time) = match (events.first(), events.last()) {
        (Some(first), Some(last)) => (first.timestamp, last.timestamp),
        _ => (0, 0),
    };

    SessionMetadata {
        start_time,
        end_time,
        duration: end_time.saturating_sub(start_time),
        url: latest_url(events).unwrap_or_default(),
        user_agent: page_defaults(events).user_agent.unwrap_or_default(),
    }
}

/// Most recent navigation or page-metadata url
pub fn latest_url(events: &[NormalizedEvent]) -> Option<String> {
    events.iter().rev().find_map(|event| match &event.details {
        EventDetails::Navigate(_) | EventDetails::PageMeta(_) => event.url.clone(),
        _ => None,
    })
}
