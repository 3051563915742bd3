//! Injected logging capability for the plan pipeline.
//!
//! The pipeline never reaches for a global logger on its own: callers hand it a
//! [`PlanLogger`]. [`NoopLogger`] is the default; [`LogFacadeLogger`] forwards to
//! the `log` facade so binaries can plug in whatever backend they install.

use log::Level;

/// Log target used when forwarding to the `log` facade.
pub const LOG_TARGET: &str = "astroplan";

/// Sink for pipeline diagnostics.
pub trait PlanLogger: Send + Sync {
    fn log(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl PlanLogger for NoopLogger {
    fn log(&self, _level: Level, _message: &str) {}
}

/// Forwards messages to the `log` crate under [`LOG_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacadeLogger;

impl PlanLogger for LogFacadeLogger {
    fn log(&self, level: Level, message: &str) {
        log::log!(target: LOG_TARGET, level, "{}", message);
    }
}
