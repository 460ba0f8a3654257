//! Sending responses that are recorded in the command cache.

use super::conversions::message_snowflake;
use super::{DiscordError, DiscordErrorKind, DiscordResult};
use botticelli_cache::CommandCache;
use serenity::client::Context;
use serenity::http::CacheHttp;
use serenity::model::channel::Message;
use serenity::model::id::{ChannelId, MessageId};
use tracing::{debug, instrument};

/// Zero-width space, used so a reply can never trigger another bot's prefix.
pub const ZERO_WIDTH_SPACE: char = '\u{200b}';

/// Message body as sent, optionally prefixed with a zero-width space.
pub fn cached_content(text: &str, prepend_zwsp: bool) -> String {
    if prepend_zwsp {
        format!("{}{}", ZERO_WIDTH_SPACE, text)
    } else {
        text.to_string()
    }
}

/// Send `text` to `channel_id` and record it as a response to `command_id`.
#[instrument(skip(cache_http, cache, text))]
pub async fn send_cached_message(
    cache_http: impl CacheHttp,
    cache: &CommandCache,
    channel_id: ChannelId,
    command_id: MessageId,
    text: &str,
    prepend_zwsp: bool,
) -> DiscordResult<Message> {
    let message = channel_id
        .say(cache_http, cached_content(text, prepend_zwsp))
        .await
        .map_err(|e| {
            DiscordError::new(DiscordErrorKind::MessageSendFailed(format!(
                "Failed to send to channel {}: {}",
                channel_id, e
            )))
        })?;
    cache.add(message_snowflake(command_id), message_snowflake(message.id));
    debug!(response_id = %message.id, "Recorded cached response");
    Ok(message)
}

/// Reply in the command's channel and record the reply.
pub async fn reply_cached(
    ctx: &Context,
    cache: &CommandCache,
    command: &Message,
    text: &str,
) -> DiscordResult<Message> {
    send_cached_message(ctx, cache, command.channel_id, command.id, text, false).await
}
