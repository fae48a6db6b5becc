//! Injected logging capability
//!
//! The engine never writes to a global logger directly. Every component that needs to
//! report something receives a [`Logger`] handle; [`LogFacade`] forwards to the `log`
//! crate and [`NoopLogger`] discards everything.

use std::sync::Mutex;

/// Log target used when forwarding to the `log` crate
pub const LOG_TARGET: &str = "friction_lens";

/// Logging sink passed into the analyzer
pub trait Logger: Send + Sync {
    /// Fine-grained diagnostics (skipped events, detector decisions)
    fn debug(&self, _message: &str) {}

    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    fn error(&self, message: &str);
}

/// Logger that discards every message
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn info(&self, _message: &str) {}

    fn warn(&self, _message: &str) {}

    fn error(&self, _message: &str) {}
}

/// Logger backed by the `log` facade
///
/// Output goes wherever the host application installed a `log` implementation
/// (e.g. `env_logger` in the CLI). Without one, messages are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacade;

impl Logger for LogFacade {
    fn debug(&self, message: &str) {
        log::debug!(target: LOG_TARGET, "{}", message);
    }

    fn info(&self, message: &str) {
        log::info!(target: LOG_TARGET, "{}", message);
    }

    fn warn(&self, message: &str) {
        log::warn!(target: LOG_TARGET, "{}", message);
    }

    fn error(&self, message: &str) {
        log::error!(target: LOG_TARGET, "{}", message);
    }
}

/// Severity of a captured log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// Logger that keeps every message in memory
///
/// Useful for embedding hosts that want to surface diagnostics alongside results.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of captured lines in arrival order
    pub fn lines(&self) -> Vec<(Level, String)> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of captured lines at the given level
    pub fn count(&self, level: Level) -> usize {
        self.lines().iter().filter(|(l, _)| *l == level).count()
    }

    fn push(&self, level: Level, message: &str) {
        let mut lines = match self.lines.lock() {
            Ok(lines) => lines,
            Err(poisoned) => poisoned.into_inner(),
        };
        lines.push((level, message.to_string()));
    }
}

impl Logger for MemoryLogger {
    fn debug(&self, message: &str) {
        self.push(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_logger_captures_levels() {
        let logger = MemoryLogger::new();
        logger.debug("d");
        logger.info("i");
        logger.warn("w1");
        logger.warn("w2");
        logger.error("e");

        assert_eq!(logger.lines().len(), 5);
        assert_eq!(logger.count(Level::Warn), 2);
        assert_eq!(logger.lines()[0], (Level::Debug, "d".to_string()));
    }

    #[test]
    fn test_noop_logger_is_object_safe() {
        let logger: Box<dyn Logger> = Box::new(NoopLogger);
        logger.debug("ignored");
        logger.info("ignored");
        logger.warn("ignored");
        logger.error("ignored");
    }
}
