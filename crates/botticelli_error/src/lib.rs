//! Error types for the Botticelli command cache.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use botticelli_error::{BotticelliResult, CacheError, CacheErrorKind};
//!
//! fn lookup() -> BotticelliResult<Vec<u64>> {
//!     Err(CacheError::new(CacheErrorKind::NotFound(7)))?
//! }
//!
//! match lookup() {
//!     Ok(ids) => println!("Got: {:?}", ids),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod cache;
mod config;
mod error;

pub use builder::{BuilderError, BuilderErrorKind};
pub use cache::{CacheError, CacheErrorKind, CacheResult};
pub use config::ConfigError;
pub use error::{BotticelliError, BotticelliErrorKind, BotticelliResult};
