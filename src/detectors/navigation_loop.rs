//! Returning to the same page over and over

use super::{Detector, MomentSink, RollingWindow};
use crate::types::{EventDetails, NormalizedEvent, Pattern};
use std::collections::HashMap;

pub const NAVIGATION_WINDOW_MS: i64 = 120_000;
pub const NAVIGATION_MIN_VISITS: usize = 3;

pub struct NavigationLoopDetector {
    visits: HashMap<String, RollingWindow<()>>,
}

impl Default for NavigationLoopDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationLoopDetector {
    pub fn new() -> Self {
        Self {
            visits: HashMap::new(),
        }
    }
}

impl Detector for NavigationLoopDetector {
    fn name(&self) -> &'static str {
        "navigation_loop"
    }

    fn observe(&mut self, index: usize, events: &[NormalizedEvent], sink: &mut MomentSink<'_>) {
        let event = &events[index];
        let EventDetails::Navigate(navigate) = &event.details else {
            return;
        };
        if navigate.url.is_empty() {
            sink.skip(index, "navigation without url");
            return;
        }

        let window = self
            .visits
            .entry(navigate.url.clone())
            .or_insert_with(|| RollingWindow::new(NAVIGATION_WINDOW_MS));
        window.evict(event.timestamp);
        window.push(event.timestamp, ());

        if window.len() >= NAVIGATION_MIN_VISITS {
            let first = window.first_timestamp().unwrap_or(event.timestamp);
            sink.emit(
                index,
                Pattern::NavigationLoop {
                    frequency: window.len() as u32,
                    time_window: event.timestamp.saturating_sub(first),
                },
            );
        }
    }
}
