//! Top-level error wrapper types.

use crate::{BuilderError, CacheError, ConfigError};

/// Every error the command cache crates can produce.
///
/// # Examples
///
/// ```
/// use botticelli_error::{BotticelliError, ConfigError};
///
/// let err: BotticelliError = ConfigError::new("missing capacity").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum BotticelliErrorKind {
    /// Configuration file error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Command cache error
    #[from(CacheError)]
    Cache(CacheError),
}

/// Botticelli error with kind discrimination.
///
/// # Examples
///
/// ```
/// use botticelli_error::{
///     BotticelliError, BotticelliErrorKind, BotticelliResult, CacheError, CacheErrorKind,
/// };
///
/// fn might_fail() -> BotticelliResult<()> {
///     Err(CacheError::new(CacheErrorKind::RuntimeUnavailable))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), BotticelliErrorKind::Cache(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Botticelli Error: {}", _0)]
pub struct BotticelliError(Box<BotticelliErrorKind>);

impl BotticelliError {
    /// Create a new error from a kind.
    pub fn new(kind: BotticelliErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &BotticelliErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to BotticelliErrorKind
impl<T> From<T> for BotticelliError
where
    T: Into<BotticelliErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Botticelli operations.
pub type BotticelliResult<T> = std::result::Result<T, BotticelliError>;
