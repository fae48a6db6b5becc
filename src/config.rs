//! Analyzer configuration

use serde::{Deserialize, Serialize};

/// Events kept on each side of a triggering event in a moment's context
pub const DEFAULT_CONTEXT_RADIUS: usize = 5;

/// Maximum distance between a moment and an external event for them to be joined
pub const DEFAULT_CORRELATION_WINDOW_MS: i64 = 30_000;

/// Tunables that shape the output of the analyzer.
///
/// Detection thresholds are fixed constants in each detector and are not configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Events before and after the triggering event to copy into `context`
    pub context_radius: usize,
    /// Temporal join window in milliseconds (exclusive)
    pub correlation_window_ms: i64,
    /// Attach a context window to event-level moments
    pub include_context: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            context_radius: DEFAULT_CONTEXT_RADIUS,
            correlation_window_ms: DEFAULT_CORRELATION_WINDOW_MS,
            include_context: true,
        }
    }
}

impl AnalyzerConfig {
    pub fn with_context_radius(mut self, radius: usize) -> Self {
        self.context_radius = radius;
        self
    }

    /// Non-positive windows fall back to the default
    pub fn with_correlation_window_ms(mut self, window_ms: i64) -> Self {
        self.correlation_window_ms = if window_ms > 0 {
            window_ms
        } else {
            DEFAULT_CORRELATION_WINDOW_MS
        };
        self
    }

    pub fn with_context(mut self, include: bool) -> Self {
        self.include_context = include;
        self
    }
}
