//! Tests for cascade deletion of responses.

use async_trait::async_trait;
use botticelli_cache::{
    CommandCache, CommandCacheConfig, InvalidationEvent, ResponseId, ResponseTransport, Snowflake,
};
use botticelli_error::{CacheError, CacheErrorKind, CacheResult};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

const CHANNEL: u64 = 555;

/// In-memory transport recording every call.
#[derive(Default)]
struct RecordingTransport {
    missing: HashSet<u64>,
    unreachable: HashSet<u64>,
    fetched: Mutex<Vec<(u64, u64)>>,
    deleted: Mutex<Vec<u64>>,
}

impl RecordingTransport {
    fn with_missing(ids: &[u64]) -> Self {
        Self {
            missing: ids.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn with_unreachable(ids: &[u64]) -> Self {
        Self {
            unreachable: ids.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn fetched(&self) -> Vec<(u64, u64)> {
        self.fetched.lock().unwrap().clone()
    }

    fn deleted(&self) -> Vec<u64> {
        let mut deleted = self.deleted.lock().unwrap().clone();
        deleted.sort();
        deleted
    }
}

#[async_trait]
impl ResponseTransport for RecordingTransport {
    type Handle = u64;

    async fn fetch(&self, channel_id: u64, response_id: ResponseId) -> CacheResult<Option<u64>> {
        let raw = response_id.get();
        self.fetched.lock().unwrap().push((channel_id, raw));
        if self.unreachable.contains(&raw) {
            return Err(CacheError::new(CacheErrorKind::Transport(
                "503 Service Unavailable".to_string(),
            )));
        }
        if self.missing.contains(&raw) {
            return Ok(None);
        }
        Ok(Some(raw))
    }

    async fn delete(&self, response: u64) -> CacheResult<()> {
        self.deleted.lock().unwrap().push(response);
        Ok(())
    }
}

/// Transport whose fetches take a while, recording deletions.
#[derive(Default)]
struct SlowTransport {
    deleted: Mutex<Vec<u64>>,
}

#[async_trait]
impl ResponseTransport for SlowTransport {
    type Handle = u64;

    async fn fetch(&self, _channel_id: u64, response_id: ResponseId) -> CacheResult<Option<u64>> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(Some(response_id.get()))
    }

    async fn delete(&self, response: u64) -> CacheResult<()> {
        self.deleted.lock().unwrap().push(response);
        Ok(())
    }
}

fn id(raw: u64) -> Snowflake {
    Snowflake::new(raw)
}

fn invalidated(command: u64) -> InvalidationEvent {
    InvalidationEvent::new(CHANNEL, id(command))
}

async fn wait_for_deletes(transport: &RecordingTransport, expected: usize) {
    for _ in 0..200 {
        if transport.deleted.lock().unwrap().len() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn test_cascade_deletes_every_response() {
    let cache = CommandCache::with_capacity(10).unwrap();
    let transport = RecordingTransport::default();
    cache.add_many(id(1), [id(11), id(12)]);

    let report = cache.on_command_invalidated(&transport, invalidated(1)).await;

    assert!(*report.tracked());
    assert_eq!(report.deleted(), &vec![id(11), id(12)]);
    assert_eq!(transport.deleted(), vec![11, 12]);
    assert_eq!(transport.fetched(), vec![(CHANNEL, 11), (CHANNEL, 12)]);
    assert!(!cache.contains_key(&id(1)));
    assert_eq!(cache.count(), 0);
}

#[tokio::test]
async fn test_missing_response_does_not_stop_cascade() {
    let cache = CommandCache::with_capacity(10).unwrap();
    let transport = RecordingTransport::with_missing(&[11]);
    cache.add_many(id(1), [id(11), id(12)]);

    let report = cache.on_command_invalidated(&transport, invalidated(1)).await;

    assert_eq!(report.missing(), &vec![id(11)]);
    assert_eq!(report.deleted(), &vec![id(12)]);
    assert_eq!(report.attempted(), 2);
    assert!(!cache.contains_key(&id(1)));
}

#[tokio::test]
async fn test_transport_error_does_not_stop_cascade() {
    let cache = CommandCache::with_capacity(10).unwrap();
    let transport = RecordingTransport::with_unreachable(&[11]);
    cache.add_many(id(1), [id(11), id(12), id(13)]);

    let report = cache.on_command_invalidated(&transport, invalidated(1)).await;

    assert_eq!(report.failed(), &vec![id(11)]);
    assert_eq!(transport.deleted(), vec![12, 13]);
    assert!(!cache.contains_key(&id(1)));
}

#[tokio::test]
async fn test_untracked_command_is_ignored() {
    let cache = CommandCache::with_capacity(10).unwrap();
    let transport = RecordingTransport::default();
    cache.add(id(2), id(20));

    let report = cache.on_command_invalidated(&transport, invalidated(1)).await;

    assert!(!*report.tracked());
    assert_eq!(report.attempted(), 0);
    assert!(transport.fetched().is_empty());
    assert_eq!(cache.count(), 1);
}

#[tokio::test]
async fn test_repeated_invalidation_processes_once() {
    let cache = CommandCache::with_capacity(10).unwrap();
    let transport = RecordingTransport::default();
    cache.add_many(id(1), [id(11), id(12)]);

    let (first, second) = tokio::join!(
        cache.on_command_invalidated(&transport, invalidated(1)),
        cache.on_command_invalidated(&transport, invalidated(1)),
    );

    assert_eq!(first.attempted() + second.attempted(), 2);
    assert_eq!(transport.deleted(), vec![11, 12]);
    assert_eq!(cache.count(), 0);
}

#[tokio::test]
async fn test_listener_consumes_events() {
    let transport = Arc::new(RecordingTransport::with_missing(&[21]));
    let (tx, rx) = mpsc::channel(16);
    let cache =
        CommandCache::with_invalidation(CommandCacheConfig::default(), Arc::clone(&transport), rx)
            .unwrap();
    cache.add(id(1), id(11));
    cache.add_many(id(2), [id(21), id(22)]);
    cache.add(id(3), id(31));

    tx.send(invalidated(1)).await.unwrap();
    tx.send(invalidated(2)).await.unwrap();
    wait_for_deletes(&transport, 2).await;

    assert_eq!(transport.deleted(), vec![11, 22]);
    assert!(!cache.contains_key(&id(1)));
    assert!(!cache.contains_key(&id(2)));
    assert!(cache.contains_key(&id(3)));
    assert_eq!(cache.count(), 1);
}

#[tokio::test]
async fn test_listener_stops_after_dispose() {
    let transport = Arc::new(RecordingTransport::default());
    let (tx, rx) = mpsc::channel(16);
    let cache = CommandCache::with_capacity(10).unwrap();
    cache.listen(Arc::clone(&transport), rx).unwrap();
    cache.add(id(1), id(11));

    cache.dispose();
    tokio::task::yield_now().await;

    // The listener has stopped, or it ignores the event.
    let _ = tx.send(invalidated(1)).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(transport.fetched().is_empty());
    assert!(cache.contains_key(&id(1)));
}

#[tokio::test(start_paused = true)]
async fn test_dispose_lets_running_cascade_finish() {
    let transport = Arc::new(SlowTransport::default());
    let (tx, rx) = mpsc::channel(16);
    let cache = CommandCache::with_capacity(10).unwrap();
    cache.listen(Arc::clone(&transport), rx).unwrap();
    cache.add_many(id(1), [id(11), id(12)]);
    cache.add(id(2), id(21));

    tx.send(invalidated(1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    cache.dispose();
    let _ = tx.send(invalidated(2)).await;
    tokio::time::sleep(Duration::from_millis(400)).await;

    let mut deleted = transport.deleted.lock().unwrap().clone();
    deleted.sort();
    assert_eq!(deleted, vec![11, 12]);
    assert!(!cache.contains_key(&id(1)));
    assert!(cache.contains_key(&id(2)));
}
