//! Command/response correlation cache for chat bots.
//!
//! A bot that answers a command message with one or more responses records
//! the pair here. When the command is deleted, the cache deletes every
//! recorded response too.
//!
//! The cache is bounded twice:
//! - by [`Capacity`]: the oldest commands are evicted first, where age comes
//!   from the timestamp embedded in each [`Snowflake`]
//! - by age: a background sweep removes commands older than the configured
//!   age limit (two hours by default)
//!
//! Invalidations arrive as [`InvalidationEvent`]s on a tokio channel and are
//! cascaded through a [`ResponseTransport`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod invalidation;
mod logger;
mod snowflake;
mod sweep;
mod table;

pub use cache::CommandCache;
pub use config::{Capacity, CommandCacheConfig, CommandCacheConfigBuilder};
pub use invalidation::{CascadeReport, InvalidationEvent, ResponseTransport};
pub use logger::{CacheLogger, LOG_SOURCE, NoopLogger, Severity};
pub use snowflake::{CommandId, DISCORD_EPOCH_MILLIS, ResponseId, Snowflake};
pub use table::ResponseSet;
