//! Bursts of scrolling, typically a user hunting for something

use super::{Detector, MomentSink, RollingWindow};
use crate::types::{EventDetails, NormalizedEvent, Pattern};

pub const SCROLL_WINDOW_MS: i64 = 5_000;
pub const SCROLL_MIN_EVENTS: usize = 8;
/// Entries kept after a trigger
pub const SCROLL_KEEP_AFTER_TRIGGER: usize = 2;

pub struct RapidScrollDetector {
    scrolls: RollingWindow<()>,
}

impl Default for RapidScrollDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RapidScrollDetector {
    pub fn new() -> Self {
        Self {
            scrolls: RollingWindow::new(SCROLL_WINDOW_MS),
        }
    }
}

impl Detector for RapidScrollDetector {
    fn name(&self) -> &'static str {
        "rapid_scroll"
    }

    fn observe(&mut self, index: usize, events: &[NormalizedEvent], sink: &mut MomentSink<'_>) {
        let event = &events[index];
        if !matches!(event.details, EventDetails::Scroll(_)) {
            return;
        }

        self.scrolls.evict(event.timestamp);
        self.scrolls.push(event.timestamp, ());

        if self.scrolls.len() >= SCROLL_MIN_EVENTS {
            let first = self.scrolls.first_timestamp().unwrap_or(event.timestamp);
            sink.emit(
                index,
                Pattern::RapidScrolling {
                    scroll_count: self.scrolls.len() as u32,
                    duration: event.timestamp.saturating_sub(first),
                },
            );
            self.scrolls.keep_last(SCROLL_KEEP_AFTER_TRIGGER);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_eight_scrolls_in_window() {
        let events: Vec<_> = (0..8).map(|i| scroll(i * 100, 0.0)).collect();

        let moments = run(RapidScrollDetector::new(), &events);
        assert_eq!(moments.len(), 1);
        assert_eq!(
            moments[0].pattern,
            Pattern::RapidScrolling {
                scroll_count: 8,
                duration: 700,
            }
        );
    }

    #[test]
    fn test_burst_retriggers_after_six_more() {
        // 8 trigger, 2 are kept, so 6 more complete the next burst
        let events: Vec<_> = (0..14).map(|i| scroll(i * 100, 0.0)).collect();

        let moments = run(RapidScrollDetector::new(), &events);
        assert_eq!(moments.len(), 2);
        assert_eq!(moments[1].timestamp, 1_300);
        assert_eq!(
            moments[1].pattern,
            Pattern::RapidScrolling {
                scroll_count: 8,
                duration: 700,
            }
        );
    }

    #[test]
    fn test_slow_scrolling() {
        let events: Vec<_> = (0..20).map(|i| scroll(i * 1_000, 0.0)).collect();
        assert!(run(RapidScrollDetector::new(), &events).is_empty());
    }
}
