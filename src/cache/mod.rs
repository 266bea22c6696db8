//! Cache orchestrator.
//!
//! The [`TieredCache`] is the public surface tying the tiers together:
//! - L1 in-memory store with LRU spill under the size cap
//! - L2 Redis store behind the [`RemoteStore`] trait
//! - placement policies deciding promotion and demotion
//! - a background maintenance sweep
//!
//! # Example
//!
//! ```rust,no_run
//! use tiered_cache::{TieredCache, CacheConfig};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = CacheConfig {
//!     enable_l2: true,
//!     l2_endpoint: Some("redis://localhost:6379".into()),
//!     max_l1_size: 10_000,
//!     ..Default::default()
//! };
//!
//! let cache: TieredCache<serde_json::Value> =
//!     TieredCache::connect(config).await.expect("connect failed");
//!
//! cache.set("user.1", serde_json::json!({"name": "Alice"}), 300).await.unwrap();
//! if let Some(value) = cache.get("user.1").await {
//!     println!("found: {}", value);
//! }
//!
//! cache.close().await.unwrap();
//! # }
//! ```

mod api;
mod lifecycle;
mod maintenance;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::entry::Entry;
use crate::error::CacheError;
use crate::policy::{DemotionPolicy, PromotionPolicy};
use crate::store::memory::LocalStore;
use crate::store::traits::RemoteStore;

/// Two-tier cache front.
///
/// Cheap to share behind an `Arc`; all operations take `&self` and are
/// safe to call from many tasks concurrently. Created via
/// [`connect`](TieredCache::connect) (real Redis L2) or
/// [`with_remote`](TieredCache::with_remote) (injected L2 and clock, the
/// seam the test suites use).
pub struct TieredCache<V> {
    pub(super) inner: Arc<CacheInner<V>>,
    pub(super) stop: watch::Sender<bool>,
    pub(super) sweeper: Mutex<Option<JoinHandle<()>>>,
}

/// Shared state behind the public handle; the maintenance task holds a
/// second `Arc` to it.
pub(super) struct CacheInner<V> {
    pub(super) config: CacheConfig,
    pub(super) promotion: Arc<dyn PromotionPolicy>,
    pub(super) demotion: Arc<dyn DemotionPolicy>,
    pub(super) l1: LocalStore<V>,
    pub(super) remote: Option<Arc<dyn RemoteStore<V>>>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) closed: AtomicBool,
}

impl<V: Clone> CacheInner<V> {
    /// The L2 handle, gated on the tier being enabled.
    pub(super) fn remote(&self) -> Option<&Arc<dyn RemoteStore<V>>> {
        if self.config.enable_l2 {
            self.remote.as_ref()
        } else {
            None
        }
    }

    pub(super) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(super) fn ensure_open(&self) -> Result<(), CacheError> {
        if self.is_closed() {
            Err(CacheError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl<V: Clone> TieredCache<V> {
    /// Approximate number of entries currently in L1.
    #[must_use]
    pub fn l1_len(&self) -> usize {
        self.inner.l1.count()
    }

    /// Copy out an L1 envelope without recording an access. Inspection
    /// only; misses here say nothing about L2.
    #[must_use]
    pub fn peek_l1(&self, key: &str) -> Option<Entry<V>> {
        self.inner.l1.get(key)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn l1_only(max_l1_size: usize) -> (TieredCache<u32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let config = CacheConfig {
            enable_l1: true,
            enable_l2: false,
            max_l1_size,
            ..Default::default()
        };
        let cache = TieredCache::with_remote(config, None, clock.clone()).unwrap();
        (cache, clock)
    }

    #[tokio::test]
    async fn test_set_get_round_trip() {
        let (cache, _clock) = l1_only(0);

        cache.set("k", 7, 60).await.unwrap();

        assert_eq!(cache.get("k").await, Some(7));
        assert_eq!(cache.l1_len(), 1);
        cache.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_after_expiry_misses_and_shrinks_l1() {
        let (cache, clock) = l1_only(0);

        cache.set("k", 7, 5).await.unwrap();
        clock.set(4);
        assert_eq!(cache.get("k").await, Some(7));

        clock.set(6);
        assert_eq!(cache.get("k").await, None);
        assert_eq!(cache.l1_len(), 0);
        cache.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_peek_does_not_touch() {
        let (cache, _clock) = l1_only(0);
        cache.set("k", 1, 60).await.unwrap();

        let before = cache.peek_l1("k").unwrap();
        let again = cache.peek_l1("k").unwrap();

        assert_eq!(before.access_count, 0);
        assert_eq!(again.access_count, 0);
        cache.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_cache_rejects_writes_and_misses_reads() {
        let (cache, _clock) = l1_only(0);
        cache.set("k", 1, 60).await.unwrap();

        cache.close().await.unwrap();

        assert!(matches!(
            cache.set("k2", 2, 60).await,
            Err(CacheError::Cancelled)
        ));
        assert!(cache.get("k").await.is_none());
        // Second close is a no-op.
        cache.close().await.unwrap();
    }
}
