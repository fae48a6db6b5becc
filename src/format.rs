//! Human-readable renderings of elements and moments

use crate::types::{ElementRef, Moment, Pattern};

const MAX_TEXT_CHARS: usize = 40;

impl ElementRef {
    /// Short selector-like label, e.g. `button#pay.btn.primary "Pay now"`
    pub fn describe(&self) -> String {
        let mut out = if self.tag.is_empty() {
            "?".to_string()
        } else {
            self.tag.to_ascii_lowercase()
        };
        if let Some(id) = self.id.as_deref().filter(|id| !id.is_empty()) {
            out.push('#');
            out.push_str(id);
        }
        for token in self.class_tokens() {
            out.push('.');
            out.push_str(token);
        }
        if let Some(text) = self.text_content.as_deref() {
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if !text.is_empty() {
                out.push_str(" \"");
                if text.chars().count() > MAX_TEXT_CHARS {
                    out.extend(text.chars().take(MAX_TEXT_CHARS));
                    out.push_str("...");
                } else {
                    out.push_str(&text);
                }
                out.push('"');
            }
        }
        out
    }
}

impl Moment {
    /// One-line description used by text output
    pub fn summary(&self) -> String {
        let detail = match &self.pattern {
            Pattern::RageClick {
                click_count,
                element,
            } => match element {
                Some(element) => format!("{} clicks on {}", click_count, element.describe()),
                None => format!("{} clicks", click_count),
            },
            Pattern::DeadClick { element } => format!("click on {}", element.describe()),
            Pattern::Hesitation { duration_ms, .. } => {
                format!("{:.1}s pause between interactions", seconds(*duration_ms))
            }
            Pattern::FormAbandonment {
                form_id,
                interaction_count,
                ..
            } => format!(
                "form {} left after {} inputs",
                form_id, interaction_count
            ),
            Pattern::NavigationLoop {
                frequency,
                time_window,
            } => format!(
                "{} visits in {:.1}s",
                frequency,
                seconds(*time_window)
            ),
            Pattern::RapidScrolling {
                scroll_count,
                duration,
            } => format!("{} scrolls in {:.1}s", scroll_count, seconds(*duration)),
            Pattern::MouseHovering { duration, position } => format!(
                "pointer held near ({:.0}, {:.0}) for {:.1}s",
                position.x,
                position.y,
                seconds(*duration)
            ),
            Pattern::MultipleSubmissions { count, element } => {
                format!("{} submits on {}", count, element.describe())
            }
            Pattern::HorizontalScrollMobile { viewport, scroll_x } => format!(
                "scrollX {} on {}x{} viewport",
                scroll_x, viewport.width, viewport.height
            ),
            Pattern::JsError { error } => error.message.clone(),
            Pattern::ShortSession {
                duration_ms,
                page_count,
            } => format!(
                "{:.1}s session, {} pages",
                seconds(*duration_ms),
                page_count
            ),
            Pattern::SessionMetrics(m) => format!(
                "{} events, {} clicks, {} inputs, {} scrolls, {} pageviews, {} errors over {:.1}s",
                m.event_count,
                m.click_count,
                m.input_count,
                m.scroll_count,
                m.pageview_count,
                m.error_count,
                seconds(m.duration)
            ),
        };

        if self.url.is_empty() {
            format!("[{}] {}: {}", self.timestamp, self.kind().as_str(), detail)
        } else {
            format!(
                "[{}] {} @ {}: {}",
                self.timestamp,
                self.kind().as_str(),
                self.url,
                detail
            )
        }
    }
}

fn seconds(ms: i64) -> f64 {
    ms as f64 / 1000.0
}
