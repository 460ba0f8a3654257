//! Pluggable log sink for cache housekeeping messages.
//!
//! Every message is also emitted through `tracing`; the sink exists for bot
//! frameworks that route add-on logs into their own log pipeline.

/// Source tag attached to every message the cache reports.
pub const LOG_SOURCE: &str = "CommandCache";

/// Severity of a reported message, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum Severity {
    /// The cache can not continue
    Critical,
    /// An operation failed
    Error,
    /// Something unexpected but recoverable happened
    Warning,
    /// Routine housekeeping
    Info,
    /// Detailed housekeeping
    Verbose,
    /// Debugging output
    Debug,
}

/// Receives cache log messages.
///
/// Any `Fn(Severity, &str, &str)` closure can be used as a logger.
///
/// # Example
///
/// ```
/// use botticelli_cache::{CacheLogger, Severity};
///
/// let logger = |severity: Severity, source: &str, message: &str| {
///     println!("[{severity}] {source}: {message}");
/// };
/// logger.log(Severity::Info, "CommandCache", "Cleaned 3 items from the cache");
/// ```
pub trait CacheLogger: Send + Sync {
    /// Record a message.
    fn log(&self, severity: Severity, source: &str, message: &str);
}

/// Logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl CacheLogger for NoopLogger {
    fn log(&self, _severity: Severity, _source: &str, _message: &str) {}
}

impl<F> CacheLogger for F
where
    F: Fn(Severity, &str, &str) + Send + Sync,
{
    fn log(&self, severity: Severity, source: &str, message: &str) {
        self(severity, source, message)
    }
}
