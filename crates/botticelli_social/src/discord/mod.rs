//! Discord integration for the command cache.
//!
//! Uses the Serenity library to:
//! - Record bot replies against the command message that caused them
//! - Turn message deletions into cache invalidation events
//! - Delete the recorded replies through Discord's HTTP API
//!
//! # Architecture
//!
//! - **transport**: [`ResponseTransport`](botticelli_cache::ResponseTransport) over
//!   Serenity's HTTP client
//! - **handler**: Event handler implementing Serenity's EventHandler trait
//! - **reply**: Helpers that send a message and record it in the cache
//! - **client**: Client setup and lifecycle management
//! - **commands**: Built-in prefix commands for demonstration bots
//! - **error**: Discord-specific error types
//!
//! # Usage
//!
//! Available with the `discord` feature.
//!
//! ```rust,ignore
//! use botticelli_social::{reply_cached, CommandCacheBot};
//!
//! // Inside an event handler:
//! reply_cached(&ctx, bot.cache(), &msg, "pong").await?;
//! ```

mod client;
mod commands;
mod conversions;
mod error;
mod handler;
mod reply;
mod transport;

pub use client::{CommandCacheBot, ShutdownHandle};
pub use commands::CacheCommand;
pub use conversions::{invalidation_event, message_snowflake};
pub use error::{DiscordError, DiscordErrorKind, DiscordResult};
pub use handler::CommandCacheHandler;
pub use reply::{ZERO_WIDTH_SPACE, cached_content, reply_cached, send_cached_message};
pub use transport::SerenityTransport;
