//! Example Discord bot using the command cache.
//!
//! Replies to `+add <a> <b>` and `+info`; deleting the command message
//! deletes the reply. Reads `DISCORD_TOKEN` from the environment or `.env`.
//! Ctrl-C disposes the cache and closes the gateway connection.

use botticelli_cache::{CacheLogger, CommandCacheConfig, Severity};
use botticelli_social::CommandCacheBot;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let token = std::env::var("DISCORD_TOKEN")?;
    let config = CommandCacheConfig::load()?;

    let logger: Arc<dyn CacheLogger> =
        Arc::new(|severity: Severity, source: &str, message: &str| {
            if severity <= Severity::Info {
                println!("{:>8} {}: {}", severity, source, message);
            }
        });

    let mut bot = CommandCacheBot::new(token, config, logger, Some('+')).await?;

    let shutdown = bot.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.shutdown().await;
        }
    });

    bot.start().await?;
    Ok(())
}
