//! Cache lifecycle: construction, L2 connection, shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::policy::FrequencyPolicy;
use crate::store::memory::LocalStore;
use crate::store::redis::RedisStore;
use crate::store::traits::RemoteStore;

use super::{maintenance, CacheInner, TieredCache};

impl<V> TieredCache<V>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Build a cache against a real Redis L2 per the configuration.
    ///
    /// Validates the configuration, connects, and verifies the server
    /// with an initial `PING`. With `enable_l2` off this never touches
    /// the network.
    pub async fn connect(config: CacheConfig) -> Result<Self, CacheError> {
        let remote: Option<Arc<dyn RemoteStore<V>>> = if config.enable_l2 {
            let endpoint = config.l2_endpoint.as_deref().ok_or_else(|| {
                CacheError::ConfigInvalid("enable_l2 requires l2_endpoint".into())
            })?;

            let store =
                RedisStore::with_prefix(endpoint, config.l2_key_prefix.as_deref()).await?;
            RemoteStore::<V>::ping(&store).await?;
            info!(endpoint, "connected to L2");
            Some(Arc::new(store))
        } else {
            None
        };

        Self::with_remote(config, remote, Arc::new(SystemClock))
    }
}

impl<V> TieredCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Build a cache around an injected L2 store and clock.
    ///
    /// This is the seam the test suites use (manual clock, mock remote);
    /// it also admits custom L2 backends. `enable_l2` with no remote is
    /// rejected.
    pub fn with_remote(
        config: CacheConfig,
        remote: Option<Arc<dyn RemoteStore<V>>>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CacheError> {
        if config.enable_l2 && remote.is_none() {
            return Err(CacheError::ConfigInvalid(
                "enable_l2 requires a remote store".into(),
            ));
        }

        let promotion = config
            .promotion
            .clone()
            .unwrap_or_else(|| Arc::new(FrequencyPolicy::new(3, 60, 0)));
        let demotion = config
            .demotion
            .clone()
            .unwrap_or_else(|| Arc::new(FrequencyPolicy::new(0, 0, 300)));

        let inner = Arc::new(CacheInner {
            config,
            promotion,
            demotion,
            l1: LocalStore::new(),
            remote,
            clock,
            closed: AtomicBool::new(false),
        });

        let (stop_tx, stop_rx) = watch::channel(false);
        let sweeper = if inner.config.enable_l1 {
            Some(maintenance::spawn_sweeper(inner.clone(), stop_rx))
        } else {
            None
        };

        Ok(Self {
            inner,
            stop: stop_tx,
            sweeper: Mutex::new(sweeper),
        })
    }

    /// Stop the maintenance sweep and await its termination.
    ///
    /// The cache is unusable afterwards: writes return
    /// [`CacheError::Cancelled`], reads miss. Idempotent; a second call
    /// is a no-op. The L2 connection is released when the cache drops.
    pub async fn close(&self) -> Result<(), CacheError> {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let _ = self.stop.send(true);
        if let Some(handle) = self.sweeper.lock().await.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "maintenance sweeper did not stop cleanly");
            }
        }
        info!("cache closed");
        Ok(())
    }
}
