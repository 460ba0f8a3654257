//! Command cache error types.

/// Kinds of command cache errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CacheErrorKind {
    /// Capacity, interval or age limit outside the accepted range
    #[display("Invalid configuration: {}", _0)]
    InvalidConfiguration(String),
    /// No entry is tracked for the command id
    #[display("No cache entry for command {}", _0)]
    NotFound(u64),
    /// Fetching or deleting a downstream response failed
    #[display("Transport error: {}", _0)]
    Transport(String),
    /// The cache was created outside of a tokio runtime
    #[display("No tokio runtime available to drive background tasks")]
    RuntimeUnavailable,
}

/// Command cache error with location tracking.
///
/// # Examples
///
/// ```
/// use botticelli_error::{CacheError, CacheErrorKind};
///
/// let err = CacheError::new(CacheErrorKind::NotFound(42));
/// assert!(format!("{}", err).contains("command 42"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Cache Error: {} at line {} in {}", kind, line, file)]
pub struct CacheError {
    /// The kind of error that occurred
    pub kind: CacheErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CacheError {
    /// Create a new cache error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CacheErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CacheErrorKind {
        &self.kind
    }

    /// Whether this error reports a missing cache entry.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, CacheErrorKind::NotFound(_))
    }
}

/// Result type for command cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;
