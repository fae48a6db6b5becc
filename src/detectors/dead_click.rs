//! Clicks on elements that have no reason to react

use super::{Detector, MomentSink};
use crate::types::{NormalizedEvent, Pattern};

pub struct DeadClickDetector;

impl Detector for DeadClickDetector {
    fn name(&self) -> &'static str {
        "dead_click"
    }

    fn observe(&mut self, index: usize, events: &[NormalizedEvent], sink: &mut MomentSink<'_>) {
        let event = &events[index];
        if !event.is_click() {
            return;
        }

        let Some(element) = event.element.as_ref() else {
            sink.skip(index, "click without element");
            return;
        };
        if element.tag.trim().is_empty() {
            sink.skip(index, "click on element without tag");
            return;
        }

        if !element.is_interactive() {
            sink.emit(
                index,
                Pattern::DeadClick {
                    element: element.clone(),
                },
            );
        }
    }
}
