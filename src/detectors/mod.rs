//! Pattern detectors
//!
//! Every detector is an isolated state machine fed from one shared forward pass
//! over a session's sorted events. Detectors never see each other's state; new
//! patterns are added by implementing [`Detector`] and registering the detector
//! in [`default_detectors`].

mod dead_click;
mod form_abandonment;
mod hesitation;
mod horizontal_scroll;
mod js_error;
mod mouse_hover;
mod multiple_submissions;
mod navigation_loop;
mod rage_click;
mod rapid_scroll;
mod window;

#[cfg(test)]
pub(crate) mod fixtures;

pub use dead_click::DeadClickDetector;
pub use form_abandonment::FormAbandonmentDetector;
pub use hesitation::HesitationDetector;
pub use horizontal_scroll::HorizontalScrollDetector;
pub use js_error::JsErrorDetector;
pub use mouse_hover::MouseHoverDetector;
pub use multiple_submissions::MultipleSubmissionsDetector;
pub use navigation_loop::NavigationLoopDetector;
pub use rage_click::RageClickDetector;
pub use rapid_scroll::RapidScrollDetector;
pub use window::RollingWindow;

use crate::logging::Logger;
use crate::types::{EventDetails, Moment, NormalizedEvent, Pattern};
use uuid::Uuid;

/// A stateful heuristic over one session's event stream
pub trait Detector {
    /// Stable name used in logs
    fn name(&self) -> &'static str;

    /// Observe `events[index]`. Earlier events may be read for lookback.
    fn observe(&mut self, index: usize, events: &[NormalizedEvent], sink: &mut MomentSink<'_>);

    /// Called once after the last event
    fn finish(&mut self, _events: &[NormalizedEvent], _sink: &mut MomentSink<'_>) {}
}

/// Fresh detector instances in their fixed evaluation order
pub fn default_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(RageClickDetector::new()),
        Box::new(DeadClickDetector),
        Box::new(HesitationDetector::new()),
        Box::new(FormAbandonmentDetector::new()),
        Box::new(NavigationLoopDetector::new()),
        Box::new(RapidScrollDetector::new()),
        Box::new(MouseHoverDetector::new()),
        Box::new(MultipleSubmissionsDetector::new()),
        Box::new(HorizontalScrollDetector::new()),
        Box::new(JsErrorDetector),
    ]
}

/// Collects moments for one session and stamps them with session context
pub struct MomentSink<'a> {
    session_id: &'a str,
    events: &'a [NormalizedEvent],
    fallback_url: String,
    current_url: Option<String>,
    context_radius: Option<usize>,
    logger: &'a dyn Logger,
    detector: &'static str,
    moments: Vec<Moment>,
}

impl<'a> MomentSink<'a> {
    /// `context_radius` of `None` disables context windows
    pub fn new(
        session_id: &'a str,
        events: &'a [NormalizedEvent],
        fallback_url: impl Into<String>,
        context_radius: Option<usize>,
        logger: &'a dyn Logger,
    ) -> Self {
        Self {
            session_id,
            events,
            fallback_url: fallback_url.into(),
            current_url: None,
            context_radius,
            logger,
            detector: "session",
            moments: Vec::new(),
        }
    }

    /// Page the user is on as of the last observed event
    pub fn url(&self) -> &str {
        self.current_url.as_deref().unwrap_or(&self.fallback_url)
    }

    /// Emit a moment triggered by `events[index]`
    pub fn emit(&mut self, index: usize, pattern: Pattern) {
        let url = self.url().to_string();
        self.emit_with_url(index, pattern, url);
    }

    /// Emit a moment triggered by `events[index]` on an explicit page
    pub fn emit_with_url(&mut self, index: usize, pattern: Pattern, url: String) {
        let events = self.events;
        let Some(event) = events.get(index) else {
            self.logger.error(&format!(
                "{}: trigger index {} out of range, moment dropped",
                self.detector, index
            ));
            return;
        };
        let context = self.context_radius.map(|radius| {
            let start = index.saturating_sub(radius);
            let end = (index + radius + 1).min(events.len());
            events[start..end].to_vec()
        });
        self.push(event.timestamp, pattern, url, context);
    }

    /// Emit a session-level moment with no triggering event
    pub fn emit_at(&mut self, timestamp: i64, pattern: Pattern) {
        let url = self.url().to_string();
        self.push(timestamp, pattern, url, None);
    }

    /// Record that an event was ignored by the current detector
    pub fn skip(&self, index: usize, reason: &str) {
        self.logger
            .debug(&format!("{}: skipped event #{}: {}", self.detector, index, reason));
    }

    pub fn len(&self) -> usize {
        self.moments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moments.is_empty()
    }

    pub fn into_moments(self) -> Vec<Moment> {
        self.moments
    }

    fn track_url(&mut self, event: &NormalizedEvent) {
        if matches!(
            event.details,
            EventDetails::Navigate(_) | EventDetails::PageMeta(_)
        ) {
            if let Some(url) = &event.url {
                self.current_url = Some(url.clone());
            }
        }
    }

    fn push(
        &mut self,
        timestamp: i64,
        pattern: Pattern,
        url: String,
        context: Option<Vec<NormalizedEvent>>,
    ) {
        let kind = pattern.kind();
        let id = moment_id(self.session_id, kind.as_str(), timestamp, self.moments.len());
        self.logger.debug(&format!(
            "{}: {} at {} on {}",
            self.detector,
            kind.as_str(),
            timestamp,
            if url.is_empty() { "<no url>" } else { url.as_str() }
        ));
        self.moments.push(Moment {
            id,
            pattern,
            timestamp,
            session_id: self.session_id.to_string(),
            url,
            context,
        });
    }
}

/// Deterministic moment identifier
fn moment_id(session_id: &str, kind: &str, timestamp: i64, ordinal: usize) -> Uuid {
    let name = format!("{}:{}:{}:{}", session_id, kind, timestamp, ordinal);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

/// Runs a set of detectors over one session
pub struct PatternScanner {
    detectors: Vec<Box<dyn Detector>>,
}

impl Default for PatternScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternScanner {
    pub fn new() -> Self {
        Self::with_detectors(default_detectors())
    }

    pub fn with_detectors(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self { detectors }
    }

    /// Single forward pass; consumes the scanner so detector state never leaks
    /// into another session
    pub fn scan(mut self, events: &[NormalizedEvent], sink: &mut MomentSink<'_>) {
        for (index, event) in events.iter().enumerate() {
            sink.track_url(event);
            for detector in self.detectors.iter_mut() {
                sink.detector = detector.name();
                detector.observe(index, events, sink);
            }
        }
        for detector in self.detectors.iter_mut() {
            sink.detector = detector.name();
            detector.finish(events, sink);
        }
        sink.detector = "session";
    }
}
