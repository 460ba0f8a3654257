//! Tests for the Discord command cache glue that need no gateway connection.

#![cfg(feature = "discord")]

use botticelli_cache::{CommandCache, CommandCacheConfig, NoopLogger, Snowflake};
use botticelli_social::{
    CacheCommand, CommandCacheBot, DiscordError, DiscordErrorKind, ZERO_WIDTH_SPACE,
    cached_content, invalidation_event, message_snowflake, send_cached_message,
};
use serenity::http::Http;
use serenity::model::id::{ChannelId, MessageId};
use std::sync::Arc;

#[test]
fn test_parse_add_command() {
    assert_eq!(
        CacheCommand::parse("+add 2 3", '+'),
        Some(CacheCommand::Add { first: 2, second: 3 })
    );
    assert_eq!(
        CacheCommand::parse("  +ADD -4 10 ", '+'),
        Some(CacheCommand::Add {
            first: -4,
            second: 10
        })
    );
}

#[test]
fn test_parse_info_aliases() {
    assert_eq!(CacheCommand::parse("+info", '+'), Some(CacheCommand::Info));
    assert_eq!(CacheCommand::parse("+stats", '+'), Some(CacheCommand::Info));
}

#[test]
fn test_parse_rejects_malformed_commands() {
    assert_eq!(CacheCommand::parse("add 2 3", '+'), None);
    assert_eq!(CacheCommand::parse("+add 2", '+'), None);
    assert_eq!(CacheCommand::parse("+add two 3", '+'), None);
    assert_eq!(CacheCommand::parse("+add 1 2 3", '+'), None);
    assert_eq!(CacheCommand::parse("+shutdown", '+'), None);
    assert_eq!(CacheCommand::parse("+", '+'), None);
}

#[tokio::test]
async fn test_command_responses() {
    let cache = CommandCache::with_capacity(10).unwrap();
    cache.add(Snowflake::new(1), Snowflake::new(2));

    let add = CacheCommand::Add {
        first: i64::MAX,
        second: 1,
    };
    assert_eq!(
        add.respond(&cache),
        format!("{} plus 1 is {}.", i64::MAX, i128::from(i64::MAX) + 1)
    );
    assert_eq!(
        CacheCommand::Info.respond(&cache),
        "Tracking 1 command(s), capacity 10."
    );
}

#[test]
fn test_cached_content_prefix() {
    assert_eq!(cached_content("hello", false), "hello");
    let prefixed = cached_content("hello", true);
    assert!(prefixed.starts_with(ZERO_WIDTH_SPACE));
    assert!(prefixed.ends_with("hello"));
}

#[test]
fn test_deleted_message_becomes_invalidation() {
    let event = invalidation_event(ChannelId::new(81), MessageId::new(175_928_847_299_117_063));
    assert_eq!(event.channel_id, 81);
    assert_eq!(event.command_id, Snowflake::new(175_928_847_299_117_063));
    assert_eq!(message_snowflake(MessageId::new(42)).get(), 42);
}

#[test]
fn test_cache_error_converts_to_discord_error() {
    let cache_err = botticelli_error::CacheError::new(
        botticelli_error::CacheErrorKind::InvalidConfiguration("capacity".into()),
    );
    let err = DiscordError::from(cache_err);
    assert!(matches!(err.kind(), DiscordErrorKind::CacheError(_)));
}

#[tokio::test]
async fn test_send_cached_message_accepts_http_client() {
    let cache = CommandCache::with_capacity(10).unwrap();
    let http = Arc::new(Http::new("not-a-real-token"));

    // Built but never polled, so nothing is sent.
    let send = send_cached_message(
        Arc::clone(&http),
        &cache,
        ChannelId::new(1),
        MessageId::new(2),
        "hello",
        true,
    );
    drop(send);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_shutdown_handle_disposes_cache() {
    let bot = CommandCacheBot::new(
        "not-a-real-token".to_string(),
        CommandCacheConfig::default(),
        Arc::new(NoopLogger),
        Some('+'),
    )
    .await
    .unwrap();
    bot.cache().add(Snowflake::new(1), Snowflake::new(2));

    let shutdown = bot.shutdown_handle();
    tokio::spawn(async move { shutdown.shutdown().await })
        .await
        .unwrap();

    assert!(bot.cache().is_disposed());
    assert!(bot.cache().contains_key(&Snowflake::new(1)));
}
