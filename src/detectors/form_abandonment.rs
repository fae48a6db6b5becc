//! Forms that were filled in and then left without submitting

use super::{Detector, MomentSink};
use crate::types::{ElementRef, EventDetails, NormalizedEvent, Pattern};
use std::collections::BTreeMap;

/// Inputs needed before a form counts as started
pub const FORM_MIN_INPUTS: u32 = 2;
/// Events searched backwards for a submit click
pub const FORM_SUBMIT_LOOKBACK: usize = 10;

#[derive(Debug, Clone)]
struct OpenForm {
    interaction_count: u32,
    last_value: Option<String>,
    url: String,
}

/// Tracks forms by id until the user navigates away or the session ends
pub struct FormAbandonmentDetector {
    forms: BTreeMap<String, OpenForm>,
}

impl Default for FormAbandonmentDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FormAbandonmentDetector {
    pub fn new() -> Self {
        Self {
            forms: BTreeMap::new(),
        }
    }

    /// Report every started form with no submit among `lookback`, then forget them
    fn close_forms(
        &mut self,
        anchor: usize,
        lookback: &[NormalizedEvent],
        sink: &mut MomentSink<'_>,
    ) {
        let forms = std::mem::take(&mut self.forms);
        for (form_id, form) in forms {
            if form.interaction_count < FORM_MIN_INPUTS {
                continue;
            }
            if lookback.iter().any(|e| submits_form(e, &form_id)) {
                continue;
            }
            sink.emit_with_url(
                anchor,
                Pattern::FormAbandonment {
                    form_id,
                    interaction_count: form.interaction_count,
                    last_value: form.last_value,
                },
                form.url,
            );
        }
    }
}

impl Detector for FormAbandonmentDetector {
    fn name(&self) -> &'static str {
        "form_abandonment"
    }

    fn observe(&mut self, index: usize, events: &[NormalizedEvent], sink: &mut MomentSink<'_>) {
        let event = &events[index];
        match &event.details {
            EventDetails::Input(details) => {
                let Some(form_id) = event.element.as_ref().and_then(ElementRef::form_id) else {
                    return;
                };
                let url = sink.url().to_string();
                let form = self
                    .forms
                    .entry(form_id.to_string())
                    .or_insert_with(|| OpenForm {
                        interaction_count: 0,
                        last_value: None,
                        url: url.clone(),
                    });
                form.interaction_count += 1;
                form.url = url;
                if details.text.is_some() {
                    form.last_value = details.text.clone();
                }
            }
            EventDetails::Navigate(_) => {
                if self.forms.is_empty() {
                    return;
                }
                let start = index.saturating_sub(FORM_SUBMIT_LOOKBACK);
                self.close_forms(index, &events[start..index], sink);
            }
            _ => {}
        }
    }

    fn finish(&mut self, events: &[NormalizedEvent], sink: &mut MomentSink<'_>) {
        if self.forms.is_empty() || events.is_empty() {
            return;
        }
        let last = events.len() - 1;
        let start = events.len().saturating_sub(FORM_SUBMIT_LOOKBACK);
        self.close_forms(last, &events[start..], sink);
    }
}

/// A click that plausibly submitted `form_id`
fn submits_form(event: &NormalizedEvent, form_id: &str) -> bool {
    if !event.is_click() {
        return false;
    }
    let Some(element) = event.element.as_ref() else {
        return false;
    };
    element.is_submit_control()
        || (element.form_id() == Some(form_id) && !is_text_entry(element))
}

/// Fields the user types into; clicking them does not submit anything
fn is_text_entry(element: &ElementRef) -> bool {
    match element.tag_upper().as_str() {
        "TEXTAREA" | "SELECT" => true,
        "INPUT" => !element.attribute("type").is_some_and(|t| {
            ["submit", "button", "image"]
                .iter()
                .any(|s| t.eq_ignore_ascii_case(s))
        }),
        _ => false,
    }
}
