//! Typed event constructors shared by detector tests

use crate::logging::NoopLogger;
use crate::types::*;

use super::{Detector, MomentSink, PatternScanner};

pub fn click_on(ts: i64, element: ElementRef) -> NormalizedEvent {
    mouse(ts, MouseAction::Click, element)
}

pub fn mouse(ts: i64, action: MouseAction, element: ElementRef) -> NormalizedEvent {
    let point = element.point();
    NormalizedEvent::new(
        ts,
        EventDetails::MouseInteraction(MouseInteractionDetails {
            action,
            x: Some(point.x),
            y: Some(point.y),
            node_id: None,
        }),
    )
    .with_element(element)
}

/// Click on a `<div>` at the given position
pub fn click_at(ts: i64, x: f64, y: f64) -> NormalizedEvent {
    click_on(ts, ElementRef::new("DIV").with_position(x, y))
}

/// `n` clicks 300 ms apart on the same spot
pub fn rage_burst(start: i64, n: i64) -> Vec<NormalizedEvent> {
    (0..n).map(|i| click_at(start + i * 300, 100.0, 100.0)).collect()
}

pub fn input(ts: i64, form: &str, text: &str) -> NormalizedEvent {
    NormalizedEvent::new(
        ts,
        EventDetails::Input(InputDetails {
            text: Some(text.to_string()),
            ..InputDetails::default()
        }),
    )
    .with_element(ElementRef::new("INPUT").with_attribute("form", form))
}

pub fn submit_button() -> ElementRef {
    ElementRef::new("BUTTON")
        .with_attribute("type", "submit")
        .with_class("btn")
}

pub fn scroll(ts: i64, x: f64) -> NormalizedEvent {
    NormalizedEvent::new(
        ts,
        EventDetails::Scroll(ScrollDetails {
            x,
            y: 400.0,
            node_id: None,
        }),
    )
}

pub fn navigate(ts: i64, url: &str) -> NormalizedEvent {
    NormalizedEvent::new(
        ts,
        EventDetails::Navigate(NavigateDetails {
            url: url.to_string(),
        }),
    )
    .with_url(url)
}

pub fn viewport(ts: i64, width: u32, height: u32) -> NormalizedEvent {
    NormalizedEvent::new(
        ts,
        EventDetails::PageMeta(PageMetaDetails {
            width: Some(width),
            height: Some(height),
            ..PageMetaDetails::default()
        }),
    )
}

pub fn mouse_move(ts: i64, samples: &[(f64, f64)]) -> NormalizedEvent {
    NormalizedEvent::new(
        ts,
        EventDetails::MouseMove(MouseMoveDetails {
            positions: samples
                .iter()
                .map(|&(x, y)| PointerSample {
                    x,
                    y,
                    time_offset: 0,
                })
                .collect(),
        }),
    )
}

pub fn error(ts: i64, message: &str) -> NormalizedEvent {
    NormalizedEvent::new(
        ts,
        EventDetails::Error(ErrorDetails {
            message: message.to_string(),
            ..ErrorDetails::default()
        }),
    )
}

/// Run a single detector over `events` and return its moments
pub fn run(detector: impl Detector + 'static, events: &[NormalizedEvent]) -> Vec<Moment> {
    let mut sink = MomentSink::new("test-session", events, "", None, &NoopLogger);
    PatternScanner::with_detectors(vec![Box::new(detector)]).scan(events, &mut sink);
    sink.into_moments()
}
