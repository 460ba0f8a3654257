//! Serenity event handler feeding the command cache.
//!
//! Message deletions become invalidation events; the cache's listener
//! deletes the recorded responses. With commands enabled the handler also
//! answers prefix commands with cached replies.

use super::commands::CacheCommand;
use super::conversions::{invalidation_event, message_snowflake};
use super::reply::reply_cached;
use botticelli_cache::{CommandCache, InvalidationEvent};
use serenity::async_trait;
use serenity::client::{Context, EventHandler};
use serenity::model::channel::Message;
use serenity::model::gateway::{GatewayIntents, Ready};
use serenity::model::id::{ChannelId, GuildId, MessageId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Event handler wiring Discord message events to a [`CommandCache`].
pub struct CommandCacheHandler {
    cache: Arc<CommandCache>,
    invalidations: mpsc::Sender<InvalidationEvent>,
    command_prefix: Option<char>,
}

impl CommandCacheHandler {
    /// Create a handler that forwards deletions into `invalidations`.
    pub fn new(cache: Arc<CommandCache>, invalidations: mpsc::Sender<InvalidationEvent>) -> Self {
        Self {
            cache,
            invalidations,
            command_prefix: None,
        }
    }

    /// Also answer [`CacheCommand`]s starting with `prefix`.
    pub fn with_commands(mut self, prefix: char) -> Self {
        self.command_prefix = Some(prefix);
        self
    }

    /// Required gateway intents for the handler.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }

    async fn forward(&self, channel_id: ChannelId, message_id: MessageId) {
        if !self.cache.contains_key(&message_snowflake(message_id)) {
            return;
        }
        debug!(channel_id = %channel_id, command_id = %message_id, "Cached command deleted");
        if self
            .invalidations
            .send(invalidation_event(channel_id, message_id))
            .await
            .is_err()
        {
            warn!(command_id = %message_id, "Invalidation listener is gone, dropping event");
        }
    }
}

#[async_trait]
impl EventHandler for CommandCacheHandler {
    /// Called when the bot successfully connects to Discord.
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_user = %ready.user.name,
            guilds = ready.guilds.len(),
            capacity = %self.cache.capacity(),
            "Command cache bot connected"
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let Some(prefix) = self.command_prefix else {
            return;
        };
        if msg.author.bot {
            return;
        }
        let Some(command) = CacheCommand::parse(&msg.content, prefix) else {
            return;
        };

        let reply = command.respond(&self.cache);
        if let Err(e) = reply_cached(&ctx, &self.cache, &msg, &reply).await {
            error!(command_id = %msg.id, error = %e, "Failed to send cached reply");
        }
    }

    async fn message_delete(
        &self,
        _ctx: Context,
        channel_id: ChannelId,
        deleted_message_id: MessageId,
        _guild_id: Option<GuildId>,
    ) {
        self.forward(channel_id, deleted_message_id).await;
    }

    async fn message_delete_bulk(
        &self,
        _ctx: Context,
        channel_id: ChannelId,
        multiple_deleted_messages_ids: Vec<MessageId>,
        _guild_id: Option<GuildId>,
    ) {
        for message_id in multiple_deleted_messages_ids {
            self.forward(channel_id, message_id).await;
        }
    }
}
