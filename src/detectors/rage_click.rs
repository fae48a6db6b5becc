//! Repeated clicks on the same spot in quick succession

use super::{Detector, MomentSink, RollingWindow};
use crate::types::{MouseAction, NormalizedEvent, Pattern, Point};

/// Rolling window for click clusters
pub const RAGE_WINDOW_MS: i64 = 1_000;
/// Per-axis distance for clicks to count as the same spot
pub const RAGE_PROXIMITY_PX: f64 = 20.0;
/// Clicks needed to trigger
pub const RAGE_MIN_CLICKS: usize = 3;

pub struct RageClickDetector {
    clicks: RollingWindow<Point>,
}

impl Default for RageClickDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RageClickDetector {
    pub fn new() -> Self {
        Self {
            clicks: RollingWindow::new(RAGE_WINDOW_MS),
        }
    }
}

impl Detector for RageClickDetector {
    fn name(&self) -> &'static str {
        "rage_click"
    }

    fn observe(&mut self, index: usize, events: &[NormalizedEvent], sink: &mut MomentSink<'_>) {
        let event = &events[index];
        if !matches!(
            event.mouse_action(),
            Some(MouseAction::Click | MouseAction::MouseDown)
        ) {
            return;
        }

        let point = event.point();
        self.clicks.evict(event.timestamp);
        self.clicks.push(event.timestamp, point);

        let nearby = self
            .clicks
            .iter()
            .filter(|(_, p)| p.is_near(&point, RAGE_PROXIMITY_PX))
            .count();

        if nearby >= RAGE_MIN_CLICKS {
            sink.emit(
                index,
                Pattern::RageClick {
                    click_count: nearby as u32,
                    element: event.element.clone(),
                },
            );
        }
    }
}
