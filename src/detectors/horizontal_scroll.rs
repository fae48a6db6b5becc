//! Sideways scrolling on a narrow viewport, usually overflowing layout

use super::{Detector, MomentSink};
use crate::types::{EventDetails, NormalizedEvent, Pattern, Viewport};

/// Viewports narrower than this count as mobile
pub const MOBILE_MAX_WIDTH: u32 = 768;

pub struct HorizontalScrollDetector {
    viewport: Option<Viewport>,
}

impl Default for HorizontalScrollDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl HorizontalScrollDetector {
    pub fn new() -> Self {
        Self { viewport: None }
    }
}

impl Detector for HorizontalScrollDetector {
    fn name(&self) -> &'static str {
        "horizontal_scroll"
    }

    fn observe(&mut self, index: usize, events: &[NormalizedEvent], sink: &mut MomentSink<'_>) {
        match &events[index].details {
            EventDetails::PageMeta(meta) => {
                if let Some(width) = meta.width {
                    self.viewport = Some(Viewport {
                        width,
                        height: meta.height.unwrap_or(0),
                    });
                }
            }
            EventDetails::Scroll(scroll) => {
                let Some(viewport) = self.viewport else {
                    return;
                };
                if viewport.width >= MOBILE_MAX_WIDTH || scroll.x == 0.0 {
                    return;
                }
                sink.emit(
                    index,
                    Pattern::HorizontalScrollMobile {
                        viewport,
                        scroll_x: scroll.x,
                    },
                );
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mobile_sideways_scroll() {
        let events = vec![
            viewport(0, 375, 812),
            scroll(100, 0.0),
            scroll(200, 40.0),
            scroll(300, 80.0),
        ];

        let moments = run(HorizontalScrollDetector::new(), &events);
        let stamps: Vec<i64> = moments.iter().map(|m| m.timestamp).collect();
        assert_eq!(stamps, vec![200, 300]);
        assert_eq!(
            moments[0].pattern,
            Pattern::HorizontalScrollMobile {
                viewport: Viewport {
                    width: 375,
                    height: 812,
                },
                scroll_x: 40.0,
            }
        );
    }

    #[test]
    fn test_desktop_or_unknown_viewport() {
        let events = vec![scroll(0, 50.0), viewport(10, 1280, 800), scroll(20, 50.0)];
        assert!(run(HorizontalScrollDetector::new(), &events).is_empty());
    }

    #[test]
    fn test_every_sideways_scroll_on_mobile_is_reported() {
        let events = vec![
            viewport(0, 375, 800),
            scroll(100, 40.0),
            scroll(200, 80.0),
            scroll(300, 120.0),
        ];
        assert_eq!(run(HorizontalScrollDetector::new(), &events).len(), 3);
    }

    #[test]
    fn test_viewport_changes_apply_to_later_scrolls() {
        let events = vec![
            viewport(0, 375, 812),
            scroll(100, 10.0),
            viewport(200, 812, 375),
            scroll(300, 10.0),
            viewport(400, 700, 900),
            scroll(500, -15.0),
        ];
        let moments = run(HorizontalScrollDetector::new(), &events);
        let stamps: Vec<i64> = moments.iter().map(|m| m.timestamp).collect();
        assert_eq!(stamps, vec![100, 500]);
    }
}
