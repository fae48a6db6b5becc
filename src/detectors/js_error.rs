//! Script errors surfaced by the recorder

use super::{Detector, MomentSink};
use crate::types::{EventDetails, NormalizedEvent, Pattern};

pub struct JsErrorDetector;

impl Detector for JsErrorDetector {
    fn name(&self) -> &'static str {
        "js_error"
    }

    fn observe(&mut self, index: usize, events: &[NormalizedEvent], sink: &mut MomentSink<'_>) {
        if let EventDetails::Error(error) = &events[index].details {
            sink.emit(
                index,
                Pattern::JsError {
                    error: error.clone(),
                },
            );
        }
    }
}
