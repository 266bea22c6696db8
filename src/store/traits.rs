use std::time::Duration;

use async_trait::async_trait;

use crate::entry::Entry;
use crate::error::CacheError;

/// Contract of the remote L2 tier.
///
/// Every method is a potentially blocking network call. Implementations
/// map transport failures to [`CacheError::L2Unreachable`] and encoding
/// failures to [`CacheError::SerializationFailed`]; the orchestrator
/// decides per call site whether to surface or degrade.
#[async_trait]
pub trait RemoteStore<V>: Send + Sync {
    /// Fetch and decode the envelope stored under `key`.
    async fn get_envelope(&self, key: &str) -> Result<Option<Entry<V>>, CacheError>;

    /// Store the envelope under `key` with the given server-side TTL.
    /// Implementations clamp the TTL to at least one second.
    async fn put_envelope(
        &self,
        key: &str,
        envelope: &Entry<V>,
        ttl_secs: u64,
    ) -> Result<(), CacheError>;

    /// Remove `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Server-side remaining lifetime of `key`; `None` when the key is
    /// absent or carries no expiry.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError>;

    /// Drop every key in the backing database, not only keys this cache
    /// wrote. Destructive; intended for tests and administrative use.
    async fn flush_all(&self) -> Result<(), CacheError>;

    /// Total number of keys in the backing database.
    async fn dbsize(&self) -> Result<u64, CacheError>;

    /// Server information blob, as reported by the store.
    async fn info(&self) -> Result<String, CacheError>;

    /// Liveness probe.
    async fn ping(&self) -> Result<(), CacheError>;
}
