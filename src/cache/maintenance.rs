// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Background maintenance: the periodic sweep that purges expired L1
//! entries, demotes idle ones, and enforces the size cap.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::metrics;

use super::{CacheInner, TieredCache};

impl<V> TieredCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Run one maintenance sweep inline, outside the periodic schedule.
    /// Tests drive placement deterministically with this.
    pub async fn tick(&self) {
        self.inner.sweep().await;
    }
}

/// Spawn the periodic sweeper. It stops when told to over the watch
/// channel, or when the cache handle is dropped without a close.
pub(super) fn spawn_sweeper<V>(
    inner: Arc<CacheInner<V>>,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let period = Duration::from_secs(inner.config.sweep_interval_secs.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; swallow it so the first sweep
        // lands one full period after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => inner.sweep().await,
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("maintenance sweeper stopped");
    })
}

impl<V> CacheInner<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// One sweep: purge expired entries, spill-and-remove demotable ones,
    /// reconcile the item counter, enforce the cap. Never fails; spill
    /// errors are logged and the affected entry is dropped.
    pub(super) async fn sweep(&self) {
        let start = Instant::now();
        let now = self.clock.now();
        let snapshot = self.l1.snapshot();

        let mut expired = Vec::new();
        let mut demotable = Vec::new();
        for (key, entry) in snapshot {
            if entry.is_expired(now) {
                expired.push(key);
            } else if self.demotion.should_demote(&entry.meta(), now) {
                demotable.push((key, entry));
            }
        }

        let mut purged = 0usize;
        for key in expired {
            if self.l1.remove(&key) {
                purged += 1;
            }
        }

        let mut demoted = 0usize;
        for (key, snap) in demotable {
            // Skip entries a reader touched since the snapshot.
            match self.l1.get(&key) {
                Some(current) if current.access_time == snap.access_time => {}
                _ => continue,
            }

            if let Some(remote) = self.remote() {
                let ttl = snap.residual_ttl(now);
                if ttl > 0 {
                    if let Err(e) = remote.put_envelope(&key, &snap, ttl as u64).await {
                        warn!(key = %key, error = %e, "demotion spill failed");
                    }
                }
            }

            if self.l1.remove_if_untouched(&key, snap.access_time) {
                demoted += 1;
            }
        }

        let count = self.l1.reconcile_count();
        let max = self.config.max_l1_size;
        if max > 0 && count > max {
            self.evict(count - max).await;
        }

        if purged > 0 {
            metrics::record_expired_purged(purged);
        }
        if demoted > 0 {
            metrics::record_demotions(demoted);
        }
        metrics::set_l1_items(self.l1.count());
        metrics::record_sweep(start.elapsed());
        debug!(
            purged,
            demoted,
            items = self.l1.count(),
            "maintenance sweep complete"
        );
    }
}
