//! Age-based sweeping of old commands.

use crate::cache::CacheInner;
use crate::{CommandId, Severity};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

impl CacheInner {
    /// Remove every entry whose command is at least `age_limit` old at `now`.
    pub(crate) fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        let Ok(age_limit) = TimeDelta::from_std(self.config.age_limit()) else {
            warn!(
                age_limit_secs = self.config.age_limit_secs(),
                "Age limit too large to evaluate, skipping sweep"
            );
            return 0;
        };

        // Every snowflake decodes to a timestamp within chrono's range.
        let expired: Vec<CommandId> = self
            .table
            .keys()
            .into_iter()
            .filter(|command| {
                command
                    .created_at()
                    .is_some_and(|created_at| now.signed_duration_since(created_at) >= age_limit)
            })
            .collect();

        let removed = expired
            .iter()
            .filter(|command| self.table.remove(command).is_some())
            .count();

        if removed > 0 {
            info!(
                removed,
                remaining = self.table.count(),
                "Swept expired commands from the cache"
            );
        } else {
            debug!(remaining = self.table.count(), "Sweep found nothing to clean");
        }
        self.report(
            Severity::Verbose,
            &format!("Cleaned {} items from the command cache", removed),
        );
        removed
    }
}

/// Start the periodic sweep. The first pass runs one full interval from now.
pub(crate) fn spawn_sweeper(inner: Arc<CacheInner>, runtime: &Handle) -> JoinHandle<()> {
    let period = inner.config.sweep_interval();
    runtime.spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if inner.is_disposed() {
                break;
            }
            inner.sweep_expired_at(Utc::now());
        }
        debug!("Command cache sweeper stopped");
    })
}
