//! Core data types for Friction Lens
//!
//! This module defines the normalized event stream, the detected moments and the
//! correlated output that flow through the analysis pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

// ============================================================================
// Normalized events
// ============================================================================

/// Kind of a normalized interaction event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PageMeta,
    Navigate,
    MouseInteraction,
    Input,
    Scroll,
    MouseMove,
    Error,
    Custom,
    Unknown,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PageMeta => "page_meta",
            EventKind::Navigate => "navigate",
            EventKind::MouseInteraction => "mouse_interaction",
            EventKind::Input => "input",
            EventKind::Scroll => "scroll",
            EventKind::MouseMove => "mouse_move",
            EventKind::Error => "error",
            EventKind::Custom => "custom",
            EventKind::Unknown => "unknown",
        }
    }

    /// Interaction-class kinds are the ones a user produces deliberately
    pub fn is_interaction(&self) -> bool {
        matches!(self, EventKind::MouseInteraction | EventKind::Input)
    }
}

/// Mouse or touch action carried by a `MouseInteraction` event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseAction {
    MouseUp,
    MouseDown,
    Click,
    ContextMenu,
    DblClick,
    Focus,
    Blur,
    TouchStart,
    TouchEnd,
    TouchCancel,
}

impl MouseAction {
    /// Map the numeric interaction code used by recorders
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(MouseAction::MouseUp),
            1 => Some(MouseAction::MouseDown),
            2 => Some(MouseAction::Click),
            3 => Some(MouseAction::ContextMenu),
            4 => Some(MouseAction::DblClick),
            5 => Some(MouseAction::Focus),
            6 => Some(MouseAction::Blur),
            7 => Some(MouseAction::TouchStart),
            9 => Some(MouseAction::TouchEnd),
            10 => Some(MouseAction::TouchCancel),
            _ => None,
        }
    }

    /// Map a textual action name (`"click"`, `"mousedown"`, `"mouse_down"`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "mouseup" => Some(MouseAction::MouseUp),
            "mousedown" => Some(MouseAction::MouseDown),
            "click" => Some(MouseAction::Click),
            "contextmenu" => Some(MouseAction::ContextMenu),
            "dblclick" | "doubleclick" => Some(MouseAction::DblClick),
            "focus" => Some(MouseAction::Focus),
            "blur" => Some(MouseAction::Blur),
            "touchstart" => Some(MouseAction::TouchStart),
            "touchend" => Some(MouseAction::TouchEnd),
            "touchcancel" => Some(MouseAction::TouchCancel),
            _ => None,
        }
    }
}

/// Bounding box of a DOM node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A 2D point in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Per-axis proximity: both |dx| and |dy| must be strictly under `threshold`
    pub fn is_near(&self, other: &Point, threshold: f64) -> bool {
        (self.x - other.x).abs() < threshold && (self.y - other.y).abs() < threshold
    }

    pub fn is_origin(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// DOM node involved in an interaction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRef {
    #[serde(default)]
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_attributes",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Attribute values as strings; numbers and booleans are stringified, nested or
/// null values are dropped without losing the rest of the element
fn deserialize_attributes<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(name, value)| match value {
            Value::String(s) => Some((name, s)),
            Value::Number(n) => Some((name, n.to_string())),
            Value::Bool(b) => Some((name, b.to_string())),
            _ => None,
        })
        .collect())
}

/// Tags that are interactive without any extra markup
const INTERACTIVE_TAGS: [&str; 6] = ["BUTTON", "A", "INPUT", "SELECT", "TEXTAREA", "LABEL"];

impl ElementRef {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position {
            x,
            y,
            ..Position::default()
        });
        self
    }

    /// Upper-cased tag name
    pub fn tag_upper(&self) -> String {
        self.tag.to_ascii_uppercase()
    }

    /// Whitespace-separated class tokens
    pub fn class_tokens(&self) -> impl Iterator<Item = &str> {
        self.class_name
            .as_deref()
            .unwrap_or("")
            .split_whitespace()
    }

    /// Attribute lookup with a case-insensitive name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Identifier of the form this element belongs to
    pub fn form_id(&self) -> Option<&str> {
        self.attribute("form")
            .or_else(|| self.attribute("data-form-id"))
            .filter(|id| !id.is_empty())
    }

    /// Top-left corner of the element, `(0, 0)` when unknown
    pub fn point(&self) -> Point {
        self.position
            .map(|p| Point::new(p.x, p.y))
            .unwrap_or_default()
    }

    /// A `<button type=submit>` or `<input type=submit>`
    pub fn is_submit_control(&self) -> bool {
        let tag = self.tag_upper();
        (tag == "BUTTON" || tag == "INPUT")
            && self
                .attribute("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("submit"))
    }

    /// Whether a click on this element is expected to do something
    pub fn is_interactive(&self) -> bool {
        let tag = self.tag_upper();
        if INTERACTIVE_TAGS.contains(&tag.as_str()) {
            return true;
        }
        let button_class = self.class_tokens().any(|token| {
            let token = token.to_ascii_lowercase();
            token.contains("btn") || token.contains("button")
        });
        let button_role = self
            .attribute("role")
            .is_some_and(|role| role.eq_ignore_ascii_case("button"));
        let click_handler = self.attribute("onclick").is_some();
        button_class || button_role || click_handler
    }

    /// Loose "this submits something" heuristic based on tag and class
    pub fn looks_like_submit(&self) -> bool {
        if self.is_submit_control() {
            return true;
        }
        self.class_tokens()
            .any(|token| token.to_ascii_lowercase().contains("submit"))
    }
}

/// Page metadata (initial meta record or viewport resize)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetaDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Navigation to a new URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigateDetails {
    pub url: String,
}

/// Mouse or touch interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MouseInteractionDetails {
    pub action: MouseAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<i64>,
}

/// Form input change
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<i64>,
}

/// Scroll offset of the page or a scrollable node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollDetails {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<i64>,
}

/// One pointer sample inside a mouse-move batch
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    /// Offset relative to the record timestamp (usually negative)
    #[serde(default)]
    pub time_offset: i64,
}

/// Batch of pointer samples
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MouseMoveDetails {
    pub positions: Vec<PointerSample>,
}

/// JavaScript error captured by the recorder
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Producer-defined event that no detector interprets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomDetails {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// Kind-specific payload of a normalized event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "details", rename_all = "snake_case")]
pub enum EventDetails {
    PageMeta(PageMetaDetails),
    Navigate(NavigateDetails),
    MouseInteraction(MouseInteractionDetails),
    Input(InputDetails),
    Scroll(ScrollDetails),
    MouseMove(MouseMoveDetails),
    Error(ErrorDetails),
    Custom(CustomDetails),
    Unknown {},
}

impl EventDetails {
    pub fn kind(&self) -> EventKind {
        match self {
            EventDetails::PageMeta(_) => EventKind::PageMeta,
            EventDetails::Navigate(_) => EventKind::Navigate,
            EventDetails::MouseInteraction(_) => EventKind::MouseInteraction,
            EventDetails::Input(_) => EventKind::Input,
            EventDetails::Scroll(_) => EventKind::Scroll,
            EventDetails::MouseMove(_) => EventKind::MouseMove,
            EventDetails::Error(_) => EventKind::Error,
            EventDetails::Custom(_) => EventKind::Custom,
            EventDetails::Unknown {} => EventKind::Unknown,
        }
    }
}

/// A single interaction event in the unified representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// Epoch milliseconds
    pub timestamp: i64,
    #[serde(flatten)]
    pub details: EventDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementRef>,
}

impl NormalizedEvent {
    pub fn new(timestamp: i64, details: EventDetails) -> Self {
        Self {
            timestamp,
            details,
            url: None,
            element: None,
        }
    }

    pub fn unknown(timestamp: i64) -> Self {
        Self::new(timestamp, EventDetails::Unknown {})
    }

    pub fn with_element(mut self, element: ElementRef) -> Self {
        self.element = Some(element);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn kind(&self) -> EventKind {
        self.details.kind()
    }

    pub fn mouse_action(&self) -> Option<MouseAction> {
        match &self.details {
            EventDetails::MouseInteraction(m) => Some(m.action),
            _ => None,
        }
    }

    pub fn is_click(&self) -> bool {
        self.mouse_action() == Some(MouseAction::Click)
    }

    /// Where the interaction happened: element position, then pointer coordinates, then origin
    pub fn point(&self) -> Point {
        if let Some(position) = self.element.as_ref().and_then(|e| e.position) {
            return Point::new(position.x, position.y);
        }
        match &self.details {
            EventDetails::MouseInteraction(m) => {
                Point::new(m.x.unwrap_or(0.0), m.y.unwrap_or(0.0))
            }
            _ => Point::default(),
        }
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// Whole-session summary derived from the event stream
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub start_time: i64,
    pub end_time: i64,
    pub duration: i64,
    pub url: String,
    pub user_agent: String,
}

/// One continuous, ordered sequence of interaction events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub events: Vec<NormalizedEvent>,
    pub metadata: SessionMetadata,
}

// ============================================================================
// Moments
// ============================================================================

/// Viewport size reported by the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Session-level counters emitted once per session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetrics {
    pub event_count: u32,
    pub click_count: u32,
    pub input_count: u32,
    pub scroll_count: u32,
    /// `Navigate` events only; the recorder's initial page-metadata record is not
    /// a pageview
    pub pageview_count: u32,
    pub error_count: u32,
    pub duration: i64,
}

/// Name of a detected behavioral pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    RageClick,
    DeadClick,
    Hesitation,
    FormAbandonment,
    NavigationLoop,
    RapidScrolling,
    MouseHovering,
    MultipleSubmissions,
    HorizontalScrollMobile,
    JsError,
    ShortSession,
    SessionMetrics,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::RageClick => "rage_click",
            PatternKind::DeadClick => "dead_click",
            PatternKind::Hesitation => "hesitation",
            PatternKind::FormAbandonment => "form_abandonment",
            PatternKind::NavigationLoop => "navigation_loop",
            PatternKind::RapidScrolling => "rapid_scrolling",
            PatternKind::MouseHovering => "mouse_hovering",
            PatternKind::MultipleSubmissions => "multiple_submissions",
            PatternKind::HorizontalScrollMobile => "horizontal_scroll_mobile",
            PatternKind::JsError => "js_error",
            PatternKind::ShortSession => "short_session",
            PatternKind::SessionMetrics => "session_metrics",
        }
    }

    /// Patterns computed from the whole session rather than a triggering event
    pub fn is_session_level(&self) -> bool {
        matches!(self, PatternKind::ShortSession | PatternKind::SessionMetrics)
    }
}

/// Type-specific fields of a moment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum Pattern {
    RageClick {
        click_count: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element: Option<ElementRef>,
    },
    DeadClick {
        element: ElementRef,
    },
    Hesitation {
        duration_ms: i64,
        before: Box<NormalizedEvent>,
        after: Box<NormalizedEvent>,
    },
    FormAbandonment {
        form_id: String,
        interaction_count: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_value: Option<String>,
    },
    NavigationLoop {
        frequency: u32,
        time_window: i64,
    },
    RapidScrolling {
        scroll_count: u32,
        duration: i64,
    },
    MouseHovering {
        duration: i64,
        position: Point,
    },
    MultipleSubmissions {
        count: u32,
        element: ElementRef,
    },
    HorizontalScrollMobile {
        viewport: Viewport,
        scroll_x: f64,
    },
    JsError {
        error: ErrorDetails,
    },
    ShortSession {
        duration_ms: i64,
        page_count: u32,
    },
    SessionMetrics(SessionMetrics),
}

impl Pattern {
    pub fn kind(&self) -> PatternKind {
        match self {
            Pattern::RageClick { .. } => PatternKind::RageClick,
            Pattern::DeadClick { .. } => PatternKind::DeadClick,
            Pattern::Hesitation { .. } => PatternKind::Hesitation,
            Pattern::FormAbandonment { .. } => PatternKind::FormAbandonment,
            Pattern::NavigationLoop { .. } => PatternKind::NavigationLoop,
            Pattern::RapidScrolling { .. } => PatternKind::RapidScrolling,
            Pattern::MouseHovering { .. } => PatternKind::MouseHovering,
            Pattern::MultipleSubmissions { .. } => PatternKind::MultipleSubmissions,
            Pattern::HorizontalScrollMobile { .. } => PatternKind::HorizontalScrollMobile,
            Pattern::JsError { .. } => PatternKind::JsError,
            Pattern::ShortSession { .. } => PatternKind::ShortSession,
            Pattern::SessionMetrics(_) => PatternKind::SessionMetrics,
        }
    }
}

/// A detected occurrence of a behavioral pattern within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moment {
    /// Stable identifier derived from the session and emission order
    pub id: Uuid,
    #[serde(flatten)]
    pub pattern: Pattern,
    pub timestamp: i64,
    pub session_id: String,
    pub url: String,
    /// Surrounding events kept as evidence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<NormalizedEvent>>,
}

impl Moment {
    pub fn kind(&self) -> PatternKind {
        self.pattern.kind()
    }
}

// ============================================================================
// External events and correlation output
// ============================================================================

/// Event captured by an independent analytics system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalEvent {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub kind: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// External event attached to a moment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredExternalEvent {
    #[serde(flatten)]
    pub event: ExternalEvent,
    /// 1.0 at the moment itself, falling linearly to 0.0 at the window edge
    pub relevance_score: f64,
}

/// A moment joined with nearby external events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelatedMoment {
    #[serde(flatten)]
    pub moment: Moment,
    /// Ordered by ascending temporal distance from the moment
    pub nearby_external_events: Vec<ScoredExternalEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_serialization() {
        let json = serde_json::to_string(&EventKind::MouseInteraction).unwrap();
        assert_eq!(json, "\"mouse_interaction\"");

        let parsed: EventKind = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, EventKind::MouseInteraction);
        assert_eq!(parsed.as_str(), "mouse_interaction");
    }

    #[test]
    fn test_normalized_event_shape() {
        let event = NormalizedEvent::new(
            1_000,
            EventDetails::Scroll(ScrollDetails {
                x: 0.0,
                y: 250.0,
                node_id: None,
            }),
        );
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["timestamp"], 1_000);
        assert_eq!(value["kind"], "scroll");
        assert_eq!(value["details"]["y"], 250.0);
        assert!(value.get("element").is_none());
    }

    #[test]
    fn test_unknown_event_has_empty_details() {
        let value = serde_json::to_value(NormalizedEvent::unknown(5)).unwrap();
        assert_eq!(value["kind"], "unknown");
        assert_eq!(value["details"], serde_json::json!({}));
    }

    #[test]
    fn test_normalized_event_deserialization() {
        let json = r#"{
            "timestamp": 42,
            "kind": "mouse_interaction",
            "details": { "action": "click", "x": 10.0, "y": 20.0 },
            "element": { "tag": "BUTTON", "className": "btn primary" }
        }"#;

        let event: NormalizedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind(), EventKind::MouseInteraction);
        assert!(event.is_click());
        assert_eq!(event.point(), Point::new(10.0, 20.0));
        let element = event.element.unwrap();
        assert_eq!(element.class_tokens().count(), 2);
    }

    #[test]
    fn test_null_attributes_are_empty() {
        let element: ElementRef =
            serde_json::from_str(r#"{ "tag": "A", "attributes": null }"#).unwrap();
        assert!(element.attributes.is_empty());
        assert!(serde_json::to_value(&element).unwrap().get("attributes").is_none());
    }

    #[test]
    fn test_point_prefers_element_position() {
        let event = NormalizedEvent::new(
            0,
            EventDetails::MouseInteraction(MouseInteractionDetails {
                action: MouseAction::Click,
                x: Some(1.0),
                y: Some(2.0),
                node_id: None,
            }),
        )
        .with_element(ElementRef::new("div").with_position(100.0, 200.0));

        assert_eq!(event.point(), Point::new(100.0, 200.0));
    }

    #[test]
    fn test_point_is_near_is_per_axis() {
        let a = Point::new(0.0, 0.0);
        // Euclidean distance ~26.9 but each axis is under 20
        assert!(a.is_near(&Point::new(19.0, 19.0), 20.0));
        assert!(!a.is_near(&Point::new(20.0, 0.0), 20.0));
        assert!(!a.is_near(&Point::new(0.0, -25.0), 20.0));
    }

    #[test]
    fn test_interactive_elements() {
        assert!(ElementRef::new("button").is_interactive());
        assert!(ElementRef::new("a").is_interactive());
        assert!(ElementRef::new("div").with_class("card btn-primary").is_interactive());
        assert!(ElementRef::new("span")
            .with_attribute("role", "button")
            .is_interactive());
        assert!(ElementRef::new("div")
            .with_attribute("onClick", "go()")
            .is_interactive());
        assert!(!ElementRef::new("div").with_class("card").is_interactive());
        assert!(!ElementRef::new("img").is_interactive());
    }

    #[test]
    fn test_submit_heuristics() {
        let submit = ElementRef::new("BUTTON").with_attribute("type", "submit");
        assert!(submit.is_submit_control());
        assert!(submit.looks_like_submit());

        let styled = ElementRef::new("div").with_class("form-submit");
        assert!(!styled.is_submit_control());
        assert!(styled.looks_like_submit());

        assert!(!ElementRef::new("button").looks_like_submit());
    }

    #[test]
    fn test_form_id_lookup() {
        let element = ElementRef::new("input").with_attribute("form", "checkout");
        assert_eq!(element.form_id(), Some("checkout"));

        let element = ElementRef::new("input").with_attribute("data-form-id", "signup");
        assert_eq!(element.form_id(), Some("signup"));

        assert_eq!(ElementRef::new("input").form_id(), None);
    }

    #[test]
    fn test_moment_serialization_is_flat() {
        let moment = Moment {
            id: Uuid::nil(),
            pattern: Pattern::RageClick {
                click_count: 3,
                element: Some(ElementRef::new("DIV")),
            },
            timestamp: 600,
            session_id: "s1".to_string(),
            url: "https://shop.test/cart".to_string(),
            context: None,
        };

        let value = serde_json::to_value(&moment).unwrap();
        assert_eq!(value["type"], "rage_click");
        assert_eq!(value["clickCount"], 3);
        assert_eq!(value["sessionId"], "s1");
        assert_eq!(value["element"]["tag"], "DIV");
        assert!(value.get("context").is_none());

        let parsed: Moment = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, moment);
    }

    #[test]
    fn test_session_metrics_pattern_serialization() {
        let pattern = Pattern::SessionMetrics(SessionMetrics {
            click_count: 4,
            ..SessionMetrics::default()
        });
        let value = serde_json::to_value(&pattern).unwrap();

        assert_eq!(value["type"], "session_metrics");
        assert_eq!(value["clickCount"], 4);
        assert_eq!(value["duration"], 0);
        assert!(pattern.kind().is_session_level());
    }
}
