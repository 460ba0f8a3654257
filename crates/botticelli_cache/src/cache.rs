//! The command cache and its background task lifecycle.

use crate::invalidation::{CascadeReport, InvalidationEvent, ResponseTransport};
use crate::table::{CacheTable, ResponseSet, Upsert};
use crate::{
    CacheLogger, Capacity, CommandCacheConfig, CommandId, LOG_SOURCE, NoopLogger, ResponseId,
    Severity,
};
use botticelli_error::{CacheError, CacheErrorKind, CacheResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::Handle;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Shared state reachable from the cache handle and its background tasks.
pub(crate) struct CacheInner {
    pub(crate) table: CacheTable,
    pub(crate) config: CommandCacheConfig,
    logger: Arc<dyn CacheLogger>,
    disposed: AtomicBool,
    shutdown: Notify,
}

impl CacheInner {
    pub(crate) fn report(&self, severity: Severity, message: &str) {
        self.logger.log(severity, LOG_SOURCE, message);
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Wakes idle listeners once the cache is disposed.
    pub(crate) fn shutdown(&self) -> &Notify {
        &self.shutdown
    }

    fn upsert(&self, command: CommandId, responses: ResponseSet, mode: Upsert) {
        let evicted = self.table.upsert(command, responses, mode);
        if !evicted.is_empty() {
            debug!(
                evicted = evicted.len(),
                oldest = %evicted[0],
                capacity = %self.table.capacity(),
                "Evicted oldest commands to make room"
            );
            self.report(
                Severity::Verbose,
                &format!("Evicted {} command(s) to stay within capacity", evicted.len()),
            );
        }
    }
}

#[derive(Default)]
struct BackgroundTasks {
    sweeper: Option<JoinHandle<()>>,
    listeners: Vec<JoinHandle<()>>,
}

/// Tracks which responses were sent for which command, so responses can be
/// deleted when their command is.
///
/// The cache is bounded by [`Capacity`] (oldest commands are evicted first)
/// and by age: a background task sweeps commands older than the configured
/// age limit. Commands are ordered and aged by the creation time embedded in
/// their snowflake id.
///
/// All methods take `&self`; share the cache across tasks with an `Arc`.
///
/// # Example
///
/// ```
/// use botticelli_cache::{CommandCache, Snowflake};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let cache = CommandCache::with_capacity(5)?;
///
/// for id in 0..5 {
///     cache.add(Snowflake::new(id), Snowflake::new(id + 100));
/// }
/// cache.add(Snowflake::new(123), Snowflake::new(456));
///
/// assert_eq!(cache.count(), 5);
/// assert!(!cache.contains_key(&Snowflake::new(0)));
/// # Ok(())
/// # }
/// ```
pub struct CommandCache {
    inner: Arc<CacheInner>,
    tasks: Mutex<BackgroundTasks>,
}

impl CommandCache {
    /// Create a cache and start its sweeper on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`CacheErrorKind::InvalidConfiguration`] if the intervals are zero
    /// - [`CacheErrorKind::RuntimeUnavailable`] outside of a tokio runtime
    pub fn new(config: CommandCacheConfig) -> CacheResult<Self> {
        Self::with_logger(config, Arc::new(NoopLogger))
    }

    /// Create a cache that reports housekeeping to `logger`.
    #[instrument(skip_all, fields(capacity = %config.capacity()))]
    pub fn with_logger(
        config: CommandCacheConfig,
        logger: Arc<dyn CacheLogger>,
    ) -> CacheResult<Self> {
        config.validate()?;
        let runtime = Handle::try_current()
            .map_err(|_| CacheError::new(CacheErrorKind::RuntimeUnavailable))?;

        let inner = Arc::new(CacheInner {
            table: CacheTable::new(*config.capacity()),
            config,
            logger,
            disposed: AtomicBool::new(false),
            shutdown: Notify::new(),
        });
        let sweeper = crate::sweep::spawn_sweeper(Arc::clone(&inner), &runtime);

        info!(
            sweep_interval_secs = inner.config.sweep_interval_secs(),
            age_limit_secs = inner.config.age_limit_secs(),
            "Command cache started"
        );

        Ok(Self {
            inner,
            tasks: Mutex::new(BackgroundTasks {
                sweeper: Some(sweeper),
                listeners: Vec::new(),
            }),
        })
    }

    /// Create a cache with default intervals and a raw capacity
    /// ([`Capacity::UNLIMITED`] or at least 1).
    pub fn with_capacity(capacity: i64) -> CacheResult<Self> {
        Self::new(CommandCacheConfig::with_raw_capacity(capacity)?)
    }

    /// Create a cache and subscribe it to invalidation events in one step.
    pub fn with_invalidation<T>(
        config: CommandCacheConfig,
        transport: T,
        events: mpsc::Receiver<InvalidationEvent>,
    ) -> CacheResult<Self>
    where
        T: ResponseTransport + 'static,
    {
        let cache = Self::new(config)?;
        cache.listen(transport, events)?;
        Ok(cache)
    }

    /// Consume invalidation events, cascading each one through `transport`.
    ///
    /// Events are handled one at a time in arrival order. The listener stops
    /// when every sender is dropped or the cache is disposed.
    pub fn listen<T>(
        &self,
        transport: T,
        events: mpsc::Receiver<InvalidationEvent>,
    ) -> CacheResult<()>
    where
        T: ResponseTransport + 'static,
    {
        let runtime = Handle::try_current()
            .map_err(|_| CacheError::new(CacheErrorKind::RuntimeUnavailable))?;

        let mut tasks = self.tasks.lock();
        if self.inner.is_disposed() {
            warn!("Ignoring invalidation listener for a disposed command cache");
            return Ok(());
        }
        let inner = Arc::clone(&self.inner);
        let listener = runtime.spawn(crate::invalidation::run_listener(inner, transport, events));
        tasks.listeners.push(listener);
        debug!(listeners = tasks.listeners.len(), "Invalidation listener attached");
        Ok(())
    }

    /// Record that `response` was sent for `command`.
    pub fn add(&self, command: CommandId, response: ResponseId) {
        self.add_many(command, [response]);
    }

    /// Record several responses for `command` in one step.
    ///
    /// Capacity is checked once for the whole batch.
    #[instrument(skip(self, responses), fields(command_id = %command))]
    pub fn add_many(&self, command: CommandId, responses: impl IntoIterator<Item = ResponseId>) {
        self.inner
            .upsert(command, responses.into_iter().collect(), Upsert::Merge);
    }

    /// Replace the responses recorded for `command`, creating the entry if needed.
    #[instrument(skip(self, responses), fields(command_id = %command))]
    pub fn set(&self, command: CommandId, responses: impl IntoIterator<Item = ResponseId>) {
        self.inner
            .upsert(command, responses.into_iter().collect(), Upsert::Replace);
    }

    /// Responses recorded for `command`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheErrorKind::NotFound`] if the command is not tracked.
    pub fn get(&self, command: &CommandId) -> CacheResult<ResponseSet> {
        self.inner
            .table
            .get(command)
            .ok_or_else(|| CacheError::new(CacheErrorKind::NotFound(command.get())))
    }

    /// Responses recorded for `command`, if it is tracked.
    pub fn try_get(&self, command: &CommandId) -> Option<ResponseSet> {
        self.inner.table.get(command)
    }

    /// Whether `command` is tracked.
    pub fn contains_key(&self, command: &CommandId) -> bool {
        self.inner.table.contains_key(command)
    }

    /// Whether `response` is recorded for `command`.
    pub fn contains(&self, command: &CommandId, response: &ResponseId) -> bool {
        self.inner.table.contains(command, response)
    }

    /// Stop tracking `command`. Returns whether an entry was removed.
    pub fn remove(&self, command: &CommandId) -> bool {
        self.take(command).is_some()
    }

    /// Stop tracking `command`, returning its responses.
    #[instrument(skip(self), fields(command_id = %command))]
    pub fn take(&self, command: &CommandId) -> Option<ResponseSet> {
        self.inner.table.remove(command)
    }

    /// Stop tracking every command.
    pub fn clear(&self) {
        let cleared = self.inner.table.clear();
        info!(cleared, "Cleared command cache");
    }

    /// Number of tracked commands.
    pub fn count(&self) -> usize {
        self.inner.table.count()
    }

    /// Alias of [`count`](Self::count).
    pub fn len(&self) -> usize {
        self.count()
    }

    /// Whether no command is tracked.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Snapshot of tracked command ids.
    pub fn keys(&self) -> Vec<CommandId> {
        self.inner.table.keys()
    }

    /// Snapshot of every response set.
    pub fn values(&self) -> Vec<ResponseSet> {
        self.inner.table.values()
    }

    /// Snapshot of every (command, responses) pair.
    pub fn entries(&self) -> Vec<(CommandId, ResponseSet)> {
        self.inner.table.entries()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> Capacity {
        self.inner.table.capacity()
    }

    /// Configuration the cache was created with.
    pub fn config(&self) -> &CommandCacheConfig {
        &self.inner.config
    }

    /// Run one sweep now, returning the number of entries removed.
    pub fn sweep_expired(&self) -> usize {
        self.inner.sweep_expired_at(chrono::Utc::now())
    }

    /// Run one sweep as if the current time were `now`.
    pub fn sweep_expired_at(&self, now: chrono::DateTime<chrono::Utc>) -> usize {
        self.inner.sweep_expired_at(now)
    }

    /// Delete every response recorded for an invalidated command and drop the entry.
    ///
    /// The entry is taken out of the table before any transport call, so
    /// concurrent invalidations of the same command process its responses once.
    pub async fn on_command_invalidated<T>(
        &self,
        transport: &T,
        event: InvalidationEvent,
    ) -> CascadeReport
    where
        T: ResponseTransport + ?Sized,
    {
        self.inner.cascade(transport, event).await
    }

    /// Stop background sweeps and invalidation listeners.
    ///
    /// Safe to call more than once. A sweep already running finishes; none
    /// starts afterwards. A listener finishes the cascade it is running and
    /// then stops without taking further events. The table stays readable.
    pub fn dispose(&self) {
        let mut tasks = self.tasks.lock();
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(sweeper) = tasks.sweeper.take() {
            sweeper.abort();
        }
        let listeners = tasks.listeners.drain(..).count();
        self.inner.shutdown.notify_waiters();
        debug!(listeners, "Command cache disposed");
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }
}

impl Drop for CommandCache {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for CommandCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandCache")
            .field("capacity", &self.capacity())
            .field("count", &self.count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
