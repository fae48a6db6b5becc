//! Long pauses between deliberate interactions

use super::{Detector, MomentSink};
use crate::types::{NormalizedEvent, Pattern};

/// Gaps must be longer than this
pub const HESITATION_MIN_MS: i64 = 10_000;
/// Gaps at or beyond this are treated as the user being away
pub const HESITATION_MAX_MS: i64 = 300_000;

/// Compares each event with the one directly before it
#[derive(Default)]
pub struct HesitationDetector;

impl HesitationDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for HesitationDetector {
    fn name(&self) -> &'static str {
        "hesitation"
    }

    fn observe(&mut self, index: usize, events: &[NormalizedEvent], sink: &mut MomentSink<'_>) {
        let Some(previous) = index.checked_sub(1).and_then(|i| events.get(i)) else {
            return;
        };
        let event = &events[index];
        if !event.kind().is_interaction() || !previous.kind().is_interaction() {
            return;
        }

        let gap = event.timestamp.saturating_sub(previous.timestamp);
        if gap > HESITATION_MIN_MS && gap < HESITATION_MAX_MS {
            sink.emit(
                index,
                Pattern::Hesitation {
                    duration_ms: gap,
                    before: Box::new(previous.clone()),
                    after: Box::new(event.clone()),
                },
            );
        }
    }
}
