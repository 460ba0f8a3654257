//! Conversions between Serenity ids and cache snowflakes.

use botticelli_cache::{InvalidationEvent, Snowflake};
use serenity::model::id::{ChannelId, MessageId};

/// Cache snowflake for a Discord message id.
pub fn message_snowflake(id: MessageId) -> Snowflake {
    Snowflake::new(id.get())
}

/// Invalidation event for a deleted message.
pub fn invalidation_event(channel_id: ChannelId, message_id: MessageId) -> InvalidationEvent {
    InvalidationEvent::new(channel_id.get(), message_snowflake(message_id))
}

/// Serenity ids for a cached response, or `None` for ids Discord never issues.
pub(crate) fn discord_ids(channel_id: u64, response: Snowflake) -> Option<(ChannelId, MessageId)> {
    if channel_id == 0 || response.get() == 0 {
        return None;
    }
    Some((ChannelId::new(channel_id), MessageId::new(response.get())))
}
