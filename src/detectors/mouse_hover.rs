//! Pointer lingering over one area

use super::{Detector, MomentSink};
use crate::types::{EventDetails, NormalizedEvent, Pattern, Point};

/// Per-axis distance between consecutive samples
pub const HOVER_PROXIMITY_PX: f64 = 30.0;
pub const HOVER_MIN_SAMPLES: usize = 3;
/// Time the cluster must span past the last check
pub const HOVER_MIN_MS: i64 = 3_000;

pub struct MouseHoverDetector {
    samples: Vec<(i64, Point)>,
    last_check: Option<i64>,
}

impl Default for MouseHoverDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl MouseHoverDetector {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
            last_check: None,
        }
    }
}

impl Detector for MouseHoverDetector {
    fn name(&self) -> &'static str {
        "mouse_hover"
    }

    fn observe(&mut self, index: usize, events: &[NormalizedEvent], sink: &mut MomentSink<'_>) {
        let event = &events[index];
        let EventDetails::MouseMove(moves) = &event.details else {
            return;
        };

        let mut discarded = 0;
        for sample in &moves.positions {
            let point = Point::new(sample.x, sample.y);
            if point.is_origin() {
                discarded += 1;
                continue;
            }
            let timestamp = event.timestamp.saturating_add(sample.time_offset);

            if let Some((_, previous)) = self.samples.last() {
                if !previous.is_near(&point, HOVER_PROXIMITY_PX) {
                    self.samples.clear();
                }
            }
            self.samples.push((timestamp, point));

            let Some(&(start, position)) = self.samples.first() else {
                continue;
            };
            let since = self.last_check.map_or(start, |check| check.max(start));
            if self.samples.len() >= HOVER_MIN_SAMPLES
                && timestamp.saturating_sub(since) > HOVER_MIN_MS
            {
                sink.emit(
                    index,
                    Pattern::MouseHovering {
                        duration: timestamp.saturating_sub(start),
                        position,
                    },
                );
                self.samples.clear();
                self.last_check = Some(timestamp);
            }
        }

        if discarded > 0 {
            sink.skip(index, &format!("{} pointer samples at (0, 0)", discarded));
        }
    }
}
