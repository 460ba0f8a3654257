//! Configuration error types.

/// Error loading or parsing a command cache configuration source.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Error message
    pub message: String,
    /// Configuration source that failed, if known
    pub source_name: Option<String>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use botticelli_error::ConfigError;
    ///
    /// let err = ConfigError::new("capacity must be an integer");
    /// assert!(err.message.contains("capacity"));
    /// assert!(err.source_name.is_none());
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            source_name: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Record which configuration source produced the error.
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }
}
