//! Discord bot client with a command cache attached.

use super::{
    CommandCacheHandler, DiscordError, DiscordErrorKind, DiscordResult, SerenityTransport,
};
use botticelli_cache::{CacheLogger, CommandCache, CommandCacheConfig};
use serenity::Client;
use serenity::gateway::ShardManager;
use serenity::http::Http;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, instrument};

/// Pending invalidation events buffered between the gateway and the cache.
const INVALIDATION_BUFFER: usize = 256;

/// Discord bot whose replies are deleted along with their commands.
///
/// # Example
/// ```no_run
/// use botticelli_cache::{CommandCacheConfig, NoopLogger};
/// use botticelli_social::CommandCacheBot;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let token = std::env::var("DISCORD_TOKEN")?;
///     let config = CommandCacheConfig::load()?;
///
///     let mut bot = CommandCacheBot::new(token, config, Arc::new(NoopLogger), Some('+')).await?;
///     bot.start().await?;
///     Ok(())
/// }
/// ```
pub struct CommandCacheBot {
    client: Client,
    cache: Arc<CommandCache>,
}

impl CommandCacheBot {
    /// Build the Serenity client, the cache, and the invalidation wiring.
    ///
    /// With `command_prefix` set, the bot also answers the built-in
    /// prefix commands.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The cache configuration is invalid
    /// - The Serenity client fails to initialize
    #[instrument(skip(token, config, logger), fields(token_len = token.len()))]
    pub async fn new(
        token: String,
        config: CommandCacheConfig,
        logger: Arc<dyn CacheLogger>,
        command_prefix: Option<char>,
    ) -> DiscordResult<Self> {
        info!("Initializing command cache bot");

        let cache = Arc::new(CommandCache::with_logger(config, logger)?);
        let (tx, rx) = mpsc::channel(INVALIDATION_BUFFER);

        let mut handler = CommandCacheHandler::new(Arc::clone(&cache), tx);
        if let Some(prefix) = command_prefix {
            handler = handler.with_commands(prefix);
        }

        let client = Client::builder(&token, CommandCacheHandler::intents())
            .event_handler(handler)
            .await
            .map_err(|e| {
                DiscordError::new(DiscordErrorKind::ConnectionFailed(format!(
                    "Failed to build client: {}",
                    e
                )))
            })?;

        cache.listen(SerenityTransport::new(Arc::clone(&client.http)), rx)?;

        info!("Serenity client built successfully");

        Ok(Self { client, cache })
    }

    /// Start the bot. Blocks until the client shuts down.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> DiscordResult<()> {
        info!("Starting command cache bot");

        self.client.start().await.map_err(|e| {
            DiscordError::new(DiscordErrorKind::ConnectionFailed(format!(
                "Client error: {}",
                e
            )))
        })?;

        Ok(())
    }

    /// Dispose the cache and close every shard.
    pub async fn shutdown(&self) {
        self.shutdown_handle().shutdown().await;
    }

    /// A handle that stops the bot from another task while [`start`](Self::start) runs.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            cache: Arc::clone(&self.cache),
            shard_manager: Arc::clone(&self.client.shard_manager),
        }
    }

    /// The bot's command cache.
    pub fn cache(&self) -> &Arc<CommandCache> {
        &self.cache
    }

    /// HTTP client shared with the cache transport.
    pub fn http_client(&self) -> Arc<Http> {
        Arc::clone(&self.client.http)
    }
}

/// Stops a running [`CommandCacheBot`].
#[derive(Clone)]
pub struct ShutdownHandle {
    cache: Arc<CommandCache>,
    shard_manager: Arc<ShardManager>,
}

impl ShutdownHandle {
    /// Dispose the cache and close every shard, which ends
    /// [`CommandCacheBot::start`].
    pub async fn shutdown(&self) {
        self.cache.dispose();
        self.shard_manager.shutdown_all().await;
        info!("Command cache bot stopped");
    }
}
