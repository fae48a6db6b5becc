//! Time-bounded queue shared by the rolling-window detectors

use std::collections::VecDeque;

/// Entries observed within the last `span_ms` milliseconds
///
/// Appends are expected in non-decreasing timestamp order. An entry stays in the
/// window while `now - timestamp <= span_ms`.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    span_ms: i64,
    entries: VecDeque<(i64, T)>,
}

impl<T> RollingWindow<T> {
    pub fn new(span_ms: i64) -> Self {
        Self {
            span_ms,
            entries: VecDeque::new(),
        }
    }

    /// Drop entries that fell out of the window as of `now`
    pub fn evict(&mut self, now: i64) {
        while let Some((timestamp, _)) = self.entries.front() {
            if now.saturating_sub(*timestamp) > self.span_ms {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn push(&mut self, timestamp: i64, value: T) {
        self.entries.push_back((timestamp, value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<i64> {
        self.entries.front().map(|(timestamp, _)| *timestamp)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(i64, T)> {
        self.entries.iter()
    }

    /// Keep only the `n` most recent entries
    pub fn keep_last(&mut self, n: usize) {
        while self.entries.len() > n {
            self.entries.pop_front();
        }
    }
}
