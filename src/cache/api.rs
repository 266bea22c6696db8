// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The public cache operations: read-through, write-through, promotion
//! on L2 hits, and size-triggered LRU spill.

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::entry::Entry;
use crate::error::CacheError;
use crate::metrics;
use crate::store::memory::{lru_victims, Lookup};

use super::{CacheInner, TieredCache};

impl<V> TieredCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Store `value` under `key` for `ttl_secs` seconds in every enabled
    /// tier. Tiers are updated in sequence, L1 first; an L2 transport
    /// failure is surfaced even though L1 already holds the value (no
    /// cross-tier atomicity).
    pub async fn set(&self, key: &str, value: V, ttl_secs: u64) -> Result<(), CacheError> {
        self.inner.set(key, value, ttl_secs).await
    }

    /// Read through the tiers: L1, then L2 with promotion of entries the
    /// policy considers hot. L2 failures degrade to a miss rather than
    /// erroring the read.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key).await
    }

    /// Like [`get`](Self::get), additionally reporting the remaining
    /// lifetime in seconds: the envelope's residual for an L1 hit, the
    /// server-reported TTL for an L2 hit.
    pub async fn get_with_ttl(&self, key: &str) -> Option<(V, u64)> {
        self.inner.get_with_ttl(key).await
    }

    /// Remove `key` from both tiers. L2 failure is surfaced.
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.inner.delete(key).await
    }

    /// Empty L1 and, when L2 is enabled, flush the **entire** L2
    /// database, including keys this cache never wrote. Intended for
    /// tests and administrative use only.
    pub async fn clear(&self) -> Result<(), CacheError> {
        self.inner.clear().await
    }

    /// Store `value` until the wall-clock `deadline` (epoch seconds).
    /// A deadline at or before now succeeds without storing anything.
    pub async fn set_with_expiration(
        &self,
        key: &str,
        value: V,
        deadline: i64,
    ) -> Result<(), CacheError> {
        self.inner.ensure_open()?;
        let now = self.inner.clock.now();
        if deadline <= now {
            return Ok(());
        }
        self.inner.set(key, value, (deadline - now) as u64).await
    }

    /// Point-in-time statistics. Keys are present only for enabled tiers
    /// whose queries succeeded: `l1_item_count`, `l1_max_size`,
    /// `redis_info`, `redis_key_count`.
    pub async fn stats(&self) -> Map<String, Value> {
        self.inner.stats().await
    }

    /// Evict up to `n` least-recently-used entries from L1, spilling
    /// unexpired ones to L2 when enabled. Normally driven by the size
    /// cap; exposed for manual pressure relief.
    pub async fn evict(&self, n: usize) {
        self.inner.evict(n).await;
    }
}

impl<V> CacheInner<V>
where
    V: Clone + Send + Sync + 'static,
{
    #[tracing::instrument(skip(self, value))]
    pub(super) async fn set(&self, key: &str, value: V, ttl_secs: u64) -> Result<(), CacheError> {
        self.ensure_open()?;
        let _timer = metrics::LatencyTimer::new("set");
        let now = self.clock.now();
        let entry = Entry::new(value, now, ttl_secs as i64);

        if self.config.enable_l1 {
            self.l1.insert(key.to_string(), entry.clone());
            metrics::record_write("l1", "set", "ok");
            metrics::set_l1_items(self.l1.count());
            self.enforce_cap().await;
        }

        if let Some(remote) = self.remote() {
            match remote.put_envelope(key, &entry, ttl_secs).await {
                Ok(()) => metrics::record_write("l2", "set", "ok"),
                Err(e) => {
                    metrics::record_write("l2", "set", "error");
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(super) async fn get(&self, key: &str) -> Option<V> {
        if self.is_closed() {
            return None;
        }
        let _timer = metrics::LatencyTimer::new("get");
        let now = self.clock.now();

        if self.config.enable_l1 {
            match self.l1.touch(key, now) {
                Lookup::Hit(entry) => {
                    metrics::record_lookup("l1", "hit");
                    return Some(entry.value);
                }
                Lookup::Expired => {
                    self.l1.remove(key);
                    metrics::record_lookup("l1", "expired");
                    metrics::set_l1_items(self.l1.count());
                }
                Lookup::Miss => {
                    metrics::record_lookup("l1", "miss");
                }
            }
        }

        let remote = self.remote()?;
        let mut envelope = match remote.get_envelope(key).await {
            Ok(Some(envelope)) => envelope,
            Ok(None) => {
                metrics::record_lookup("l2", "miss");
                return None;
            }
            Err(e) => {
                // Reads degrade: a miss beats failing the caller.
                warn!(key, error = %e, "L2 get failed, treating as miss");
                metrics::record_lookup("l2", "error");
                return None;
            }
        };

        // The server expires keys on its own clock; double-check on ours.
        if envelope.is_expired(now) {
            metrics::record_lookup("l2", "expired");
            return None;
        }

        envelope.touch(now);
        metrics::record_lookup("l2", "hit");
        let write_back_ttl = envelope.residual_ttl(now).max(1) as u64;
        self.absorb_l2_hit(key, &envelope, write_back_ttl, now).await;
        Some(envelope.value)
    }

    #[tracing::instrument(skip(self))]
    pub(super) async fn get_with_ttl(&self, key: &str) -> Option<(V, u64)> {
        if self.is_closed() {
            return None;
        }
        let _timer = metrics::LatencyTimer::new("get_with_ttl");
        let now = self.clock.now();

        if self.config.enable_l1 {
            match self.l1.touch(key, now) {
                Lookup::Hit(entry) => {
                    metrics::record_lookup("l1", "hit");
                    let residual_ttl = entry.residual_ttl(now) as u64;
                    return Some((entry.value, residual_ttl));
                }
                Lookup::Expired => {
                    self.l1.remove(key);
                    metrics::record_lookup("l1", "expired");
                    metrics::set_l1_items(self.l1.count());
                }
                Lookup::Miss => {
                    metrics::record_lookup("l1", "miss");
                }
            }
        }

        let remote = self.remote()?;

        // The server's TTL is authoritative for the reported remainder.
        let ttl_secs = match remote.ttl(key).await {
            Ok(Some(ttl)) => ttl.as_secs(),
            Ok(None) => {
                metrics::record_lookup("l2", "miss");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "L2 ttl query failed, treating as miss");
                metrics::record_lookup("l2", "error");
                return None;
            }
        };

        let mut envelope = match remote.get_envelope(key).await {
            Ok(Some(envelope)) => envelope,
            Ok(None) => {
                metrics::record_lookup("l2", "miss");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "L2 get failed, treating as miss");
                metrics::record_lookup("l2", "error");
                return None;
            }
        };

        if envelope.is_expired(now) {
            metrics::record_lookup("l2", "expired");
            return None;
        }

        envelope.touch(now);
        metrics::record_lookup("l2", "hit");
        self.absorb_l2_hit(key, &envelope, ttl_secs, now).await;
        Some((envelope.value, ttl_secs))
    }

    #[tracing::instrument(skip(self))]
    pub(super) async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.ensure_open()?;
        let _timer = metrics::LatencyTimer::new("delete");

        if self.config.enable_l1 && self.l1.remove(key) {
            metrics::record_write("l1", "delete", "ok");
            metrics::set_l1_items(self.l1.count());
        }

        if let Some(remote) = self.remote() {
            match remote.delete(key).await {
                Ok(()) => metrics::record_write("l2", "delete", "ok"),
                Err(e) => {
                    metrics::record_write("l2", "delete", "error");
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(super) async fn clear(&self) -> Result<(), CacheError> {
        self.ensure_open()?;

        if self.config.enable_l1 {
            self.l1.clear();
            metrics::set_l1_items(0);
        }

        if let Some(remote) = self.remote() {
            remote.flush_all().await?;
            debug!("flushed L2 database");
        }

        Ok(())
    }

    pub(super) async fn stats(&self) -> Map<String, Value> {
        let mut stats = Map::new();

        if self.config.enable_l1 {
            stats.insert("l1_item_count".into(), json!(self.l1.count()));
            stats.insert("l1_max_size".into(), json!(self.config.max_l1_size));
        }

        if let Some(remote) = self.remote() {
            if let Ok(info) = remote.info().await {
                stats.insert("redis_info".into(), json!(info));
            }
            if let Ok(size) = remote.dbsize().await {
                stats.insert("redis_key_count".into(), json!(size));
            }
        }

        stats
    }

    /// Copy a touched L2 envelope into L1 when the promotion policy
    /// agrees, then push the updated metadata back to L2. The write-back
    /// is best-effort; a failure only loses an access-count hint.
    async fn absorb_l2_hit(&self, key: &str, envelope: &Entry<V>, write_back_ttl: u64, now: i64) {
        if self.config.enable_l1 && self.promotion.should_promote(&envelope.meta(), now) {
            self.l1.insert(key.to_string(), envelope.clone());
            metrics::record_promotion();
            metrics::set_l1_items(self.l1.count());
            debug!(key, "promoted L2 hit into L1");
            self.enforce_cap().await;
        }

        if let Some(remote) = self.remote() {
            if let Err(e) = remote.put_envelope(key, envelope, write_back_ttl).await {
                debug!(key, error = %e, "metadata write-back to L2 failed");
            }
        }
    }

    /// Spill one entry when the L1 cap is exceeded. The count is
    /// approximate under racing writers; the sweep corrects any residue.
    pub(super) async fn enforce_cap(&self) {
        let max = self.config.max_l1_size;
        if max > 0 && self.l1.count() > max {
            self.evict(1).await;
        }
    }

    /// Evict up to `n` least-recently-used entries, spilling unexpired
    /// ones to L2 first. Entries touched or removed since the snapshot
    /// are skipped.
    pub(super) async fn evict(&self, n: usize) {
        let now = self.clock.now();
        let snapshot = self.l1.snapshot();
        let mut evicted = 0usize;

        for (key, snap) in lru_victims(&snapshot, n) {
            match self.l1.get(&key) {
                Some(current) if current.access_time == snap.access_time => {}
                _ => continue,
            }

            if snap.expire_time > now {
                if let Some(remote) = self.remote() {
                    let ttl = snap.residual_ttl(now) as u64;
                    if let Err(e) = remote.put_envelope(&key, &snap, ttl).await {
                        // Best-effort spill: the entry is dropped either way.
                        warn!(key = %key, error = %e, "spill to L2 failed");
                    }
                }
            }

            if self.l1.remove_if_untouched(&key, snap.access_time) {
                evicted += 1;
            }
        }

        if evicted > 0 {
            metrics::record_evictions(evicted);
            metrics::set_l1_items(self.l1.count());
            debug!(evicted, "evicted least recently used entries");
        }
    }
}
