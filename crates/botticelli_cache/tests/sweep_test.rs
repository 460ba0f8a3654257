//! Tests for age-based sweeping.

use botticelli_cache::{CacheLogger, CommandCache, CommandCacheConfig, Severity, Snowflake};
use chrono::{Duration as AgeDelta, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn created_ago(age: AgeDelta) -> Snowflake {
    Snowflake::from_datetime(Utc::now() - age)
}

fn minute_sweeps() -> CommandCacheConfig {
    CommandCacheConfig::default()
        .with_sweep_interval_secs(60)
        .with_age_limit_secs(7200)
}

#[tokio::test]
async fn test_sweep_removes_only_old_entries() {
    let cache = CommandCache::new(CommandCacheConfig::default()).unwrap();
    let old = created_ago(AgeDelta::hours(3));
    let young = created_ago(AgeDelta::minutes(5));
    cache.add(old, Snowflake::new(1));
    cache.add(young, Snowflake::new(2));

    let removed = cache.sweep_expired();

    assert_eq!(removed, 1);
    assert!(!cache.contains_key(&old));
    assert!(cache.contains_key(&young));
    assert_eq!(cache.count(), 1);
}

#[tokio::test]
async fn test_sweep_boundary_is_inclusive() {
    let cache = CommandCache::new(CommandCacheConfig::default()).unwrap();
    let now = Utc::now();
    let exactly_limit = Snowflake::from_datetime(now - AgeDelta::hours(2));
    let just_under = Snowflake::from_datetime(now - AgeDelta::hours(2) + AgeDelta::seconds(1));
    cache.add(exactly_limit, Snowflake::new(1));
    cache.add(just_under, Snowflake::new(2));

    assert_eq!(cache.sweep_expired_at(now), 1);
    assert!(cache.contains_key(&just_under));
}

#[tokio::test]
async fn test_sweep_reports_cleaned_count() {
    let messages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&messages);
    let logger: Arc<dyn CacheLogger> =
        Arc::new(move |severity: Severity, source: &str, message: &str| {
            sink.lock()
                .unwrap()
                .push((severity, source.to_string(), message.to_string()));
        });
    let cache = CommandCache::with_logger(CommandCacheConfig::default(), logger).unwrap();
    cache.add(created_ago(AgeDelta::hours(5)), Snowflake::new(1));
    cache.add(created_ago(AgeDelta::hours(4)), Snowflake::new(2));

    cache.sweep_expired();

    let messages = messages.lock().unwrap();
    assert!(messages.iter().any(|(severity, source, message)| {
        *severity == Severity::Verbose
            && source == "CommandCache"
            && message.contains("Cleaned 2 items")
    }));
}

#[tokio::test(start_paused = true)]
async fn test_background_sweep_runs_on_interval() {
    let cache = CommandCache::new(minute_sweeps()).unwrap();
    let old = created_ago(AgeDelta::hours(3));
    let young = created_ago(AgeDelta::minutes(1));
    cache.add(old, Snowflake::new(1));
    cache.add(young, Snowflake::new(2));

    tokio::time::sleep(Duration::from_secs(59)).await;
    assert!(cache.contains_key(&old), "no sweep before the first interval");

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!cache.contains_key(&old));
    assert!(cache.contains_key(&young));
}

#[tokio::test(start_paused = true)]
async fn test_no_sweep_after_dispose() {
    let cache = CommandCache::new(minute_sweeps()).unwrap();
    let old = created_ago(AgeDelta::hours(3));
    cache.add(old, Snowflake::new(1));

    cache.dispose();
    tokio::time::sleep(Duration::from_secs(600)).await;

    assert!(cache.contains_key(&old));
}

#[tokio::test(start_paused = true)]
async fn test_sweep_picks_up_entries_added_later() {
    let cache = CommandCache::new(minute_sweeps()).unwrap();

    tokio::time::sleep(Duration::from_secs(61)).await;
    let old = created_ago(AgeDelta::hours(3));
    cache.add(old, Snowflake::new(1));
    assert!(cache.contains_key(&old));

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(!cache.contains_key(&old));
}
