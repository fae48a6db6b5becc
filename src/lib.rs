//! Friction Lens - UX friction detection for recorded user sessions
//!
//! Lens turns a raw, low-level interaction recording into a handful of "moments"
//! that point at probable friction (rage clicks, dead clicks, abandoned forms and
//! so on), then joins each moment with nearby events from an independent analytics
//! log: normalization → metadata → pattern detection → session aggregation →
//! temporal join.
//!
//! ## Modules
//!
//! - **Normalization**: raw records and external events into typed events
//! - **Detection**: independent detectors sharing one pass over a session
//! - **Correlation**: windowed, scored join with external analytics events

pub mod aggregate;
pub mod config;
pub mod correlate;
pub mod detectors;
pub mod error;
pub mod format;
pub mod logging;
pub mod metadata;
pub mod normalizer;
pub mod pipeline;
pub mod schema;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::AnalyzerConfig;
pub use correlate::correlate;
pub use error::{AnalysisError, MalformedRecordWarning};
pub use logging::{LogFacade, Logger, NoopLogger};
pub use pipeline::{analyze_session, SessionAnalyzer, SessionReport};

// Schema exports
pub use schema::{ExternalEventAdapter, RawInteractionRecord, RecordAdapter, RECORD_FORMAT};

/// Library version
pub const LENS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "friction-lens";
