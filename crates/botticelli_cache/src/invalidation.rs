//! Cascade deletion of responses when their command is invalidated.
//!
//! The chat framework reports invalidated (deleted) commands as
//! [`InvalidationEvent`]s. For each event the cache takes the command's entry
//! out of its table and asks a [`ResponseTransport`] to fetch and delete
//! every recorded response. Missing responses and transport failures are
//! logged and skipped; they never stop the remaining deletions.

use crate::cache::CacheInner;
use crate::{CommandId, ResponseId, Severity};
use async_trait::async_trait;
use botticelli_error::CacheResult;
use derive_getters::Getters;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, instrument, warn};

/// A command was invalidated externally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_new::new)]
pub struct InvalidationEvent {
    /// Channel the command and its responses were posted in
    pub channel_id: u64,
    /// The invalidated command
    pub command_id: CommandId,
}

/// Fetches and deletes downstream responses.
///
/// Implemented over the chat platform's HTTP API in production and by
/// in-memory fakes in tests.
#[async_trait]
pub trait ResponseTransport: Send + Sync {
    /// A fetched response that can be deleted.
    type Handle: Send;

    /// Look up a response. `Ok(None)` means it no longer exists.
    async fn fetch(
        &self,
        channel_id: u64,
        response_id: ResponseId,
    ) -> CacheResult<Option<Self::Handle>>;

    /// Delete a previously fetched response.
    async fn delete(&self, response: Self::Handle) -> CacheResult<()>;
}

#[async_trait]
impl<T> ResponseTransport for Arc<T>
where
    T: ResponseTransport + ?Sized,
{
    type Handle = T::Handle;

    async fn fetch(
        &self,
        channel_id: u64,
        response_id: ResponseId,
    ) -> CacheResult<Option<Self::Handle>> {
        (**self).fetch(channel_id, response_id).await
    }

    async fn delete(&self, response: Self::Handle) -> CacheResult<()> {
        (**self).delete(response).await
    }
}

/// Outcome of one cascade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct CascadeReport {
    /// Whether the command was tracked when the event arrived
    tracked: bool,
    /// Responses that were deleted
    deleted: Vec<ResponseId>,
    /// Responses that no longer existed downstream
    missing: Vec<ResponseId>,
    /// Responses whose fetch or delete failed
    failed: Vec<ResponseId>,
}

impl CascadeReport {
    /// Number of responses a delete was attempted for.
    pub fn attempted(&self) -> usize {
        self.deleted.len() + self.missing.len() + self.failed.len()
    }
}

impl CacheInner {
    #[instrument(
        skip(self, transport),
        fields(command_id = %event.command_id, channel_id = event.channel_id)
    )]
    pub(crate) async fn cascade<T>(&self, transport: &T, event: InvalidationEvent) -> CascadeReport
    where
        T: ResponseTransport + ?Sized,
    {
        let Some(responses) = self.table.remove(&event.command_id) else {
            debug!("Invalidated command is not tracked");
            return CascadeReport::default();
        };

        let mut report = CascadeReport {
            tracked: true,
            ..CascadeReport::default()
        };

        for response_id in responses {
            match transport.fetch(event.channel_id, response_id).await {
                Ok(Some(handle)) => match transport.delete(handle).await {
                    Ok(()) => report.deleted.push(response_id),
                    Err(e) => {
                        error!(response_id = %response_id, error = %e, "Failed to delete response");
                        self.report(
                            Severity::Error,
                            &format!(
                                "Failed to delete response {} of command {}: {}",
                                response_id, event.command_id, e
                            ),
                        );
                        report.failed.push(response_id);
                    }
                },
                Ok(None) => {
                    warn!(response_id = %response_id, "Response already gone");
                    self.report(
                        Severity::Warning,
                        &format!(
                            "Response {} of command {} was not found",
                            response_id, event.command_id
                        ),
                    );
                    report.missing.push(response_id);
                }
                Err(e) => {
                    error!(response_id = %response_id, error = %e, "Failed to fetch response");
                    self.report(
                        Severity::Error,
                        &format!(
                            "Failed to fetch response {} of command {}: {}",
                            response_id, event.command_id, e
                        ),
                    );
                    report.failed.push(response_id);
                }
            }
        }

        debug!(
            deleted = report.deleted.len(),
            missing = report.missing.len(),
            failed = report.failed.len(),
            "Cascade finished"
        );
        report
    }
}

/// Drain `events` until the channel closes or the cache is disposed.
///
/// Disposal never interrupts a cascade that has already taken its entry out
/// of the table; the listener stops before the next event instead.
pub(crate) async fn run_listener<T>(
    inner: Arc<CacheInner>,
    transport: T,
    mut events: mpsc::Receiver<InvalidationEvent>,
) where
    T: ResponseTransport,
{
    loop {
        let shutdown = inner.shutdown().notified();
        tokio::pin!(shutdown);
        shutdown.as_mut().enable();
        if inner.is_disposed() {
            break;
        }

        let event = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            event = events.recv() => event,
        };
        let Some(event) = event else {
            break;
        };
        if inner.is_disposed() {
            break;
        }
        inner.cascade(&transport, event).await;
    }
    debug!("Invalidation listener stopped");
}
