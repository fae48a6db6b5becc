//! Hitting submit again and again because nothing seems to happen

use super::{Detector, MomentSink, RollingWindow};
use crate::types::{NormalizedEvent, Pattern};

pub const SUBMIT_WINDOW_MS: i64 = 10_000;
/// Earlier submit clicks needed in the window
pub const SUBMIT_MIN_PRIOR: usize = 2;

pub struct MultipleSubmissionsDetector {
    submits: RollingWindow<()>,
}

impl Default for MultipleSubmissionsDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipleSubmissionsDetector {
    pub fn new() -> Self {
        Self {
            submits: RollingWindow::new(SUBMIT_WINDOW_MS),
        }
    }
}

impl Detector for MultipleSubmissionsDetector {
    fn name(&self) -> &'static str {
        "multiple_submissions"
    }

    fn observe(&mut self, index: usize, events: &[NormalizedEvent], sink: &mut MomentSink<'_>) {
        let event = &events[index];
        if !event.is_click() {
            return;
        }
        let Some(element) = event.element.as_ref().filter(|e| e.looks_like_submit()) else {
            return;
        };

        self.submits.evict(event.timestamp);
        let prior = self.submits.len();
        if prior >= SUBMIT_MIN_PRIOR {
            sink.emit(
                index,
                Pattern::MultipleSubmissions {
                    count: (prior + 1) as u32,
                    element: element.clone(),
                },
            );
        }
        self.submits.push(event.timestamp, ());
    }
}
