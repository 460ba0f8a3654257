//! Chat platform integrations for the Botticelli command cache.
//!
//! # Platform Support
//!
//! Each platform is feature-gated and lives in its own submodule:
//! - `discord` - Discord bot integration (requires `discord` feature, on by default)
//!
//! Platform implementations follow a common pattern:
//! - Platform-specific error types
//! - A [`ResponseTransport`](botticelli_cache::ResponseTransport) over the platform API
//! - An event handler turning deletions into invalidation events
//! - Reply helpers that record responses in the cache

#![warn(missing_docs)]

#[cfg(feature = "discord")]
mod discord;

#[cfg(feature = "discord")]
pub use discord::{
    CacheCommand, CommandCacheBot, CommandCacheHandler, DiscordError, DiscordErrorKind,
    DiscordResult, SerenityTransport, ShutdownHandle, ZERO_WIDTH_SPACE, cached_content,
    invalidation_event, message_snowflake, reply_cached, send_cached_message,
};
