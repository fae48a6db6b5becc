//! Pipeline orchestration
//!
//! This module provides the public API for Friction Lens.
//! It runs one session from raw interaction records to correlated moments.
//!
//! Pipeline stages:
//! 1. Normalizer - map raw records to sorted `NormalizedEvent`s
//! 2. Metadata - derive start/end/duration/url/user agent
//! 3. PatternScanner - single pass through every detector
//! 4. SessionAggregator - session-level moments
//! 5. TemporalJoin - attach nearby external events

use crate::aggregate::SessionAggregator;
use crate::config::AnalyzerConfig;
use crate::correlate::correlate;
use crate::detectors::{MomentSink, PatternScanner};
use crate::error::{AnalysisError, MalformedRecordWarning};
use crate::logging::{LogFacade, Logger};
use crate::metadata::build_metadata;
use crate::normalizer::{page_defaults, NormalizedBatch, Normalizer};
use crate::schema::ExternalEventAdapter;
use crate::types::{CorrelatedMoment, ExternalEvent, Moment, Session, SessionMetadata};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Analyze one session and return the correlated moments as a JSON array.
///
/// # Arguments
/// * `session_id` - Identifier stamped on every moment
/// * `records_json` - JSON array of raw interaction records
/// * `external_json` - JSON array of external analytics events (empty string for none)
///
/// # Example
/// ```ignore
/// let moments_json = analyze_session("session-42", &records, &analytics)?;
/// ```
pub fn analyze_session(
    session_id: &str,
    records_json: &str,
    external_json: &str,
) -> Result<String, AnalysisError> {
    SessionAnalyzer::new().analyze_json(session_id, records_json, external_json)
}

/// Everything produced for one session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: String,
    pub metadata: SessionMetadata,
    pub moments: Vec<CorrelatedMoment>,
    pub warnings: Vec<MalformedRecordWarning>,
}

/// Session analyzer with fixed configuration.
///
/// The analyzer holds no per-session state: every call builds fresh detectors, so
/// one instance can serve many sessions, including from several threads.
pub struct SessionAnalyzer {
    config: AnalyzerConfig,
    logger: Arc<dyn Logger>,
}

impl Default for SessionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionAnalyzer {
    /// Create an analyzer with default settings, logging through the `log` crate
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self {
            config,
            logger: Arc::new(LogFacade),
        }
    }

    /// Replace the logger
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Normalize raw interaction records
    pub fn normalize(&self, records: &Value) -> Result<NormalizedBatch, AnalysisError> {
        Normalizer::normalize(records, self.logger.as_ref())
    }

    /// Normalize records and assemble the session
    pub fn build_session(
        &self,
        session_id: &str,
        records: &Value,
    ) -> Result<(Session, Vec<MalformedRecordWarning>), AnalysisError> {
        let batch = self.normalize(records)?;
        let metadata = build_metadata(&batch.events);
        let session = Session {
            session_id: session_id.to_string(),
            events: batch.events,
            metadata,
        };
        Ok((session, batch.warnings))
    }

    /// Run every detector and the aggregator over a session
    ///
    /// Moments come out in detection order followed by the session-level moments,
    /// `SessionMetrics` always last.
    pub fn detect(&self, session: &Session) -> Vec<Moment> {
        let fallback_url = page_defaults(&session.events)
            .url
            .unwrap_or_else(|| session.metadata.url.clone());
        let context_radius = self
            .config
            .include_context
            .then_some(self.config.context_radius);

        let mut sink = MomentSink::new(
            &session.session_id,
            &session.events,
            fallback_url,
            context_radius,
            self.logger.as_ref(),
        );
        PatternScanner::new().scan(&session.events, &mut sink);
        let detected = sink.len();
        SessionAggregator::summarize(session, &mut sink);

        self.logger.info(&format!(
            "session {}: {} events, {} pattern moments",
            session.session_id,
            session.events.len(),
            detected
        ));
        sink.into_moments()
    }

    /// Attach nearby external events to each moment
    pub fn correlate(
        &self,
        moments: &[Moment],
        external: &[ExternalEvent],
    ) -> Vec<CorrelatedMoment> {
        correlate(moments, external, self.config.correlation_window_ms)
    }

    /// Full pipeline over parsed JSON values
    pub fn analyze(
        &self,
        session_id: &str,
        records: &Value,
        external: &Value,
    ) -> Result<SessionReport, AnalysisError> {
        let (session, mut warnings) = self.build_session(session_id, records)?;

        let external = ExternalEventAdapter::normalize(external)?;
        for warning in &external.warnings {
            self.logger.warn(&warning.to_string());
        }
        warnings.extend(external.warnings);

        let moments = self.detect(&session);
        let moments = self.correlate(&moments, &external.events);

        Ok(SessionReport {
            session_id: session.session_id,
            metadata: session.metadata,
            moments,
            warnings,
        })
    }

    /// Full pipeline over JSON text, returning the `CorrelatedMoment` array as JSON
    pub fn analyze_json(
        &self,
        session_id: &str,
        records_json: &str,
        external_json: &str,
    ) -> Result<String, AnalysisError> {
        let records: Value = serde_json::from_str(records_json)?;
        let external: Value = if external_json.trim().is_empty() {
            Value::Array(Vec::new())
        } else {
            serde_json::from_str(external_json)?
        };

        let report = self.analyze(session_id, &records, &external)?;
        serde_json::to_string(&report.moments)
            .map_err(|e| AnalysisError::EncodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{Level, MemoryLogger, NoopLogger};
    use crate::types::{Pattern, PatternKind, SessionMetrics};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn analyzer() -> SessionAnalyzer {
        SessionAnalyzer::new().with_logger(Arc::new(NoopLogger))
    }

    fn meta(ts: i64, href: &str) -> Value {
        json!({ "type": 4, "timestamp": ts, "data": { "href": href, "width": 1280, "height": 800 } })
    }

    fn click(ts: i64, x: f64, y: f64, element: Value) -> Value {
        json!({
            "type": 3,
            "timestamp": ts,
            "data": { "source": 2, "type": 2, "x": x, "y": y, "element": element }
        })
    }

    fn div_at(x: f64, y: f64) -> Value {
        json!({ "tag": "DIV", "position": { "x": x, "y": y, "width": 40, "height": 20 } })
    }

    fn input(ts: i64, form: &str, text: &str) -> Value {
        json!({
            "type": 3,
            "timestamp": ts,
            "data": {
                "source": 5,
                "text": text,
                "element": { "tag": "INPUT", "attributes": { "form": form } }
            }
        })
    }

    fn pageview(ts: i64, url: &str) -> Value {
        json!({ "type": 5, "timestamp": ts, "data": { "tag": "$pageview", "payload": { "href": url } } })
    }

    fn kinds(moments: &[Moment]) -> Vec<PatternKind> {
        moments.iter().map(|m| m.kind()).collect()
    }

    fn detect(records: Value) -> Vec<Moment> {
        let analyzer = analyzer();
        let (session, _) = analyzer.build_session("s1", &records).unwrap();
        analyzer.detect(&session)
    }

    #[test]
    fn test_empty_input() {
        let report = analyzer().analyze("empty", &json!([]), &json!([])).unwrap();

        assert_eq!(report.metadata, SessionMetadata::default());
        assert_eq!(report.moments.len(), 1);
        assert_eq!(
            report.moments[0].moment.pattern,
            Pattern::SessionMetrics(SessionMetrics::default())
        );
        assert!(report.moments[0].nearby_external_events.is_empty());
    }

    #[test]
    fn test_invalid_top_level_input() {
        let result = analyzer().analyze("s", &json!({ "events": [] }), &json!([]));
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));

        let result = analyzer().analyze("s", &json!([]), &json!("nope"));
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));

        let result = analyze_session("s", "[", "[]");
        assert!(matches!(result, Err(AnalysisError::JsonError(_))));
    }

    #[test]
    fn test_events_are_sorted() {
        let records = json!([
            click(900, 1.0, 1.0, json!({ "tag": "BUTTON" })),
            meta(0, "https://shop.test/"),
            click(300, 1.0, 1.0, json!({ "tag": "BUTTON" })),
            click(300, 2.0, 2.0, json!({ "tag": "A" }))
        ]);

        let (session, _) = analyzer().build_session("s", &records).unwrap();
        let timestamps: Vec<i64> = session.events.iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![0, 300, 300, 900]);
        assert_eq!(
            session.events[1].element.as_ref().map(|e| e.tag.as_str()),
            Some("BUTTON")
        );
    }

    #[test]
    fn test_rage_click_boundary() {
        let records = json!([
            meta(0, "https://shop.test/cart"),
            click(0, 100.0, 100.0, div_at(100.0, 100.0)),
            click(300, 105.0, 102.0, div_at(105.0, 102.0)),
            click(600, 110.0, 95.0, div_at(110.0, 95.0)),
            click(2_000, 100.0, 100.0, div_at(100.0, 100.0))
        ]);

        let moments = detect(records);
        let rage: Vec<&Moment> = moments
            .iter()
            .filter(|m| m.kind() == PatternKind::RageClick)
            .collect();
        assert_eq!(rage.len(), 1);
        assert_eq!(rage[0].timestamp, 600);
        assert_eq!(rage[0].url, "https://shop.test/cart");
        match &rage[0].pattern {
            Pattern::RageClick { click_count, .. } => assert_eq!(*click_count, 3),
            other => panic!("unexpected pattern {:?}", other),
        }
    }

    #[test]
    fn test_dead_click_exclusion() {
        let button = detect(json!([click(0, 5.0, 5.0, json!({ "tag": "BUTTON", "className": "btn" }))]));
        assert!(!kinds(&button).contains(&PatternKind::DeadClick));

        let div = detect(json!([click(0, 5.0, 5.0, json!({ "tag": "DIV" }))]));
        assert!(kinds(&div).contains(&PatternKind::DeadClick));
    }

    #[test]
    fn test_form_abandonment_vs_submission() {
        let submit = json!({ "tag": "BUTTON", "attributes": { "type": "submit" } });
        let submitted = detect(json!([
            pageview(0, "https://shop.test/signup"),
            input(1_000, "f1", "a"),
            input(2_000, "f1", "ab"),
            click(3_000, 10.0, 10.0, submit),
            pageview(4_000, "https://shop.test/welcome")
        ]));
        assert!(!kinds(&submitted).contains(&PatternKind::FormAbandonment));

        let abandoned = detect(json!([
            pageview(0, "https://shop.test/signup"),
            input(1_000, "f1", "a"),
            input(2_000, "f1", "ab"),
            pageview(4_000, "https://shop.test/elsewhere")
        ]));
        let forms: Vec<&Moment> = abandoned
            .iter()
            .filter(|m| m.kind() == PatternKind::FormAbandonment)
            .collect();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].url, "https://shop.test/signup");
        match &forms[0].pattern {
            Pattern::FormAbandonment {
                interaction_count, ..
            } => assert_eq!(*interaction_count, 2),
            other => panic!("unexpected pattern {:?}", other),
        }
    }

    #[test]
    fn test_join_window_boundary() {
        let records = json!([
            meta(0, "https://shop.test/"),
            json!({ "type": 3, "timestamp": 1_000, "data": { "source": 9, "error": "boom" } }),
            json!({ "type": 3, "timestamp": 40_000, "data": { "source": 3, "x": 0, "y": 10 } })
        ]);
        let external = json!([
            { "timestamp": 30_999, "event": "inside" },
            { "timestamp": 31_001, "event": "outside" }
        ]);

        let report = analyzer().analyze("s", &records, &external).unwrap();
        let error = report
            .moments
            .iter()
            .find(|m| m.moment.kind() == PatternKind::JsError)
            .unwrap();
        assert_eq!(error.moment.timestamp, 1_000);
        assert_eq!(error.nearby_external_events.len(), 1);
        assert_eq!(error.nearby_external_events[0].event.kind, "inside");
        assert_eq!(error.nearby_external_events[0].relevance_score, 0.0);
    }

    #[test]
    fn test_iso_external_timestamps_are_joined() {
        let base = 1_705_327_200_000_i64;
        let records = json!([
            meta(base, "https://shop.test/"),
            json!({ "type": 5, "timestamp": base + 500, "data": { "tag": "error", "payload": { "message": "boom" } } })
        ]);
        let external = json!([{ "timestamp": "2024-01-15T14:00:01Z", "kind": "api_error" }]);

        let report = analyzer().analyze("s", &records, &external).unwrap();
        let error = report
            .moments
            .iter()
            .find(|m| m.moment.kind() == PatternKind::JsError)
            .unwrap();
        assert_eq!(error.nearby_external_events.len(), 1);
        assert_eq!(error.nearby_external_events[0].relevance_score, 0.98);
    }

    fn scroll_x(ts: i64, x: f64) -> Value {
        json!({ "type": 3, "timestamp": ts, "data": { "source": 3, "x": x, "y": 0 } })
    }

    #[test]
    fn test_hesitation_needs_adjacent_interactions() {
        let moved = detect(json!([
            click(0, 5.0, 5.0, json!({ "tag": "BUTTON" })),
            json!({ "type": 3, "timestamp": 11_000, "data": { "source": 1, "positions": [{ "x": 40, "y": 40 }] } }),
            click(22_000, 5.0, 5.0, json!({ "tag": "BUTTON" }))
        ]));
        assert!(!kinds(&moved).contains(&PatternKind::Hesitation));

        let paused = detect(json!([
            click(0, 5.0, 5.0, json!({ "tag": "BUTTON" })),
            click(22_000, 5.0, 5.0, json!({ "tag": "BUTTON" }))
        ]));
        assert!(kinds(&paused).contains(&PatternKind::Hesitation));
    }

    #[test]
    fn test_each_sideways_scroll_on_mobile() {
        let moments = detect(json!([
            json!({ "type": 4, "timestamp": 0, "data": { "href": "https://m.test/", "width": 375, "height": 800 } }),
            scroll_x(100, 40.0),
            scroll_x(200, 80.0),
            scroll_x(300, 120.0)
        ]));
        let sideways: Vec<f64> = moments
            .iter()
            .filter_map(|m| match &m.pattern {
                Pattern::HorizontalScrollMobile { scroll_x, .. } => Some(*scroll_x),
                _ => None,
            })
            .collect();
        assert_eq!(sideways, vec![40.0, 80.0, 120.0]);
    }

    #[test]
    fn test_navigation_loop_window_rolls() {
        let moments = detect(json!([
            pageview(0, "https://shop.test/cart"),
            pageview(1_000, "https://shop.test/cart"),
            pageview(2_000, "https://shop.test/cart"),
            pageview(3_000, "https://shop.test/cart"),
            pageview(4_000, "https://shop.test/cart")
        ]));
        let loops = kinds(&moments)
            .into_iter()
            .filter(|k| *k == PatternKind::NavigationLoop)
            .count();
        assert_eq!(loops, 3);
    }

    #[test]
    fn test_numeric_attributes_keep_dead_click() {
        let moments = detect(json!([click(
            0,
            5.0,
            5.0,
            json!({ "tag": "DIV", "attributes": { "tabindex": 0, "aria-hidden": false } })
        )]));
        assert!(kinds(&moments).contains(&PatternKind::DeadClick));
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let records = json!([
            click(i64::MIN + 1, 5.0, 5.0, json!({ "tag": "BUTTON" })),
            json!({
                "type": 3,
                "timestamp": i64::MAX,
                "data": { "source": 1, "positions": [
                    { "x": 50, "y": 50, "timeOffset": 0 },
                    { "x": 51, "y": 50, "timeOffset": 2_000 },
                    { "x": 52, "y": 50, "timeOffset": 5_000 }
                ] }
            }),
            click(i64::MAX, 5.0, 5.0, json!({ "tag": "BUTTON" }))
        ]);
        let external = json!([{ "timestamp": 0, "kind": "far away" }]);

        let report = analyzer().analyze("s", &records, &external).unwrap();
        assert_eq!(report.metadata.duration, i64::MAX);
        let kinds: Vec<PatternKind> = report.moments.iter().map(|m| m.moment.kind()).collect();
        assert!(!kinds.contains(&PatternKind::Hesitation));
        assert_eq!(kinds.last(), Some(&PatternKind::SessionMetrics));
        assert!(report
            .moments
            .iter()
            .all(|m| m.nearby_external_events.is_empty()));
    }

    #[test]
    fn test_determinism() {
        let records = json!([
            meta(0, "https://shop.test/"),
            click(100, 100.0, 100.0, div_at(100.0, 100.0)),
            click(200, 100.0, 100.0, div_at(100.0, 100.0)),
            click(300, 100.0, 100.0, div_at(100.0, 100.0)),
            input(20_000, "f1", "a"),
            input(21_000, "f1", "ab")
        ])
        .to_string();
        let external = json!([{ "timestamp": 250, "kind": "click" }]).to_string();

        let first = analyze_session("s", &records, &external).unwrap();
        let second = analyze_session("s", &records, &external).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_moment_order_and_context() {
        let moments = detect(json!([
            meta(0, "https://shop.test/"),
            click(100, 100.0, 100.0, div_at(100.0, 100.0)),
            click(200, 100.0, 100.0, div_at(100.0, 100.0)),
            click(300, 100.0, 100.0, div_at(100.0, 100.0))
        ]));

        let kinds = kinds(&moments);
        assert_eq!(kinds.last(), Some(&PatternKind::SessionMetrics));
        assert_eq!(kinds[kinds.len() - 2], PatternKind::ShortSession);
        // Dead clicks on the first three, rage click on the third
        assert_eq!(
            &kinds[..4],
            &[
                PatternKind::DeadClick,
                PatternKind::DeadClick,
                PatternKind::RageClick,
                PatternKind::DeadClick
            ]
        );
        assert_eq!(moments[2].context.as_ref().map(Vec::len), Some(4));
        assert!(moments.last().unwrap().context.is_none());
    }

    #[test]
    fn test_context_can_be_disabled() {
        let analyzer = SessionAnalyzer::with_config(AnalyzerConfig::default().with_context(false))
            .with_logger(Arc::new(NoopLogger));
        let (session, _) = analyzer
            .build_session("s", &json!([click(0, 1.0, 1.0, json!({ "tag": "DIV" }))]))
            .unwrap();

        let moments = analyzer.detect(&session);
        assert!(moments.iter().all(|m| m.context.is_none()));
    }

    #[test]
    fn test_url_falls_back_to_metadata() {
        let moments = detect(json!([
            click(0, 1.0, 1.0, json!({ "tag": "DIV" })),
            pageview(500, "https://shop.test/after")
        ]));
        assert_eq!(moments[0].kind(), PatternKind::DeadClick);
        assert_eq!(moments[0].url, "https://shop.test/after");
    }

    #[test]
    fn test_warnings_are_reported_and_logged() {
        let logger = Arc::new(MemoryLogger::new());
        let analyzer = SessionAnalyzer::new().with_logger(logger.clone());

        let report = analyzer
            .analyze(
                "s",
                &json!([{ "type": 3, "data": {} }, meta(0, "https://shop.test/")]),
                &json!([{ "timestamp": "yesterday", "kind": "x" }]),
            )
            .unwrap();

        assert_eq!(report.warnings.len(), 2);
        assert_eq!(logger.count(Level::Warn), 2);
        assert_eq!(logger.count(Level::Info), 1);
    }

    #[test]
    fn test_json_output_is_moment_array() {
        let output = analyze_session("s", r#"[{"type":4,"timestamp":5,"data":{"href":"https://a.test/"}}]"#, "")
            .unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        let moments = value.as_array().unwrap();
        assert_eq!(moments.len(), 2);
        assert_eq!(moments[1]["type"], "session_metrics");
        assert_eq!(moments[1]["sessionId"], "s");
        assert_eq!(moments[1]["url"], "https://a.test/");
        assert_eq!(moments[1]["nearbyExternalEvents"], json!([]));
    }
}
