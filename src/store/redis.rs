//! Redis adapter for the L2 tier.
//!
//! Envelopes cross the wire as self-describing JSON with stable field
//! names (`value`, `create_time`, `expire_time`, `access_time`,
//! `access_count`) stored under plain STRING keys via `SET key value EX
//! ttl`, so the server expires entries on its own clock as a backstop to
//! the envelope's `expire_time`.
//!
//! Commands are retried with fast backoff; whatever still fails surfaces
//! as [`CacheError::L2Unreachable`] and the orchestrator decides whether
//! the call site degrades or propagates.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{cmd, AsyncCommands, Client};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::entry::Entry;
use crate::error::CacheError;
use crate::retry::{retry, RetryConfig};

use super::traits::RemoteStore;

pub struct RedisStore<V> {
    connection: ConnectionManager,
    /// Optional key prefix for namespacing (e.g. "myapp:" -> "myapp:user.1")
    prefix: String,
    _value: PhantomData<fn() -> V>,
}

impl<V> RedisStore<V> {
    /// Connect without a key prefix.
    pub async fn connect(endpoint: &str) -> Result<Self, CacheError> {
        Self::with_prefix(endpoint, None).await
    }

    /// Connect with an optional key prefix.
    ///
    /// The prefix is prepended to all entry keys, enabling namespacing
    /// when sharing a Redis instance with other applications. Note that
    /// `flush_all` and `dbsize` still address the whole database, prefix
    /// or not.
    pub async fn with_prefix(endpoint: &str, prefix: Option<&str>) -> Result<Self, CacheError> {
        let client =
            Client::open(endpoint).map_err(|e| CacheError::ConfigInvalid(e.to_string()))?;

        // Startup config: fast-fail after a few seconds, don't hang forever
        let connection = retry("redis_connect", &RetryConfig::startup(), || async {
            ConnectionManager::new(client.clone()).await
        })
        .await
        .map_err(|e: redis::RedisError| CacheError::L2Unreachable(e.to_string()))?;

        Ok(Self {
            connection,
            prefix: prefix.unwrap_or("").to_string(),
            _value: PhantomData,
        })
    }

    #[inline]
    fn prefixed_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}{}", self.prefix, key)
        }
    }

    /// The configured prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

#[async_trait]
impl<V> RemoteStore<V> for RedisStore<V>
where
    V: Serialize + DeserializeOwned + Send + Sync,
{
    async fn get_envelope(&self, key: &str) -> Result<Option<Entry<V>>, CacheError> {
        let conn = self.connection.clone();
        let prefixed = self.prefixed_key(key);

        let data: Option<Vec<u8>> = retry("redis_get", &RetryConfig::query(), || {
            let mut conn = conn.clone();
            let key = prefixed.clone();
            async move {
                let data: Option<Vec<u8>> = conn.get(&key).await?;
                Ok(data)
            }
        })
        .await
        .map_err(|e: redis::RedisError| CacheError::L2Unreachable(e.to_string()))?;

        data.map(|bytes| {
            serde_json::from_slice(&bytes)
                .map_err(|e| CacheError::SerializationFailed(e.to_string()))
        })
        .transpose()
    }

    async fn put_envelope(
        &self,
        key: &str,
        envelope: &Entry<V>,
        ttl_secs: u64,
    ) -> Result<(), CacheError> {
        let data = serde_json::to_vec(envelope)
            .map_err(|e| CacheError::SerializationFailed(e.to_string()))?;

        let conn = self.connection.clone();
        let prefixed = self.prefixed_key(key);
        let ttl = ttl_secs.max(1);

        retry("redis_set", &RetryConfig::query(), || {
            let mut conn = conn.clone();
            let key = prefixed.clone();
            let data = data.clone();
            async move {
                let _: () = conn.set_ex(&key, data.as_slice(), ttl).await?;
                Ok(())
            }
        })
        .await
        .map_err(|e: redis::RedisError| CacheError::L2Unreachable(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let conn = self.connection.clone();
        let prefixed = self.prefixed_key(key);

        retry("redis_delete", &RetryConfig::query(), || {
            let mut conn = conn.clone();
            let key = prefixed.clone();
            async move {
                let _: () = conn.del(&key).await?;
                Ok(())
            }
        })
        .await
        .map_err(|e: redis::RedisError| CacheError::L2Unreachable(e.to_string()))
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError> {
        let conn = self.connection.clone();
        let prefixed = self.prefixed_key(key);

        let secs: i64 = retry("redis_ttl", &RetryConfig::query(), || {
            let mut conn = conn.clone();
            let key = prefixed.clone();
            async move {
                let secs: i64 = conn.ttl(&key).await?;
                Ok(secs)
            }
        })
        .await
        .map_err(|e: redis::RedisError| CacheError::L2Unreachable(e.to_string()))?;

        // -2 means missing, -1 means no expiry set.
        if secs > 0 {
            Ok(Some(Duration::from_secs(secs as u64)))
        } else {
            Ok(None)
        }
    }

    async fn flush_all(&self) -> Result<(), CacheError> {
        let conn = self.connection.clone();

        retry("redis_flushdb", &RetryConfig::query(), || {
            let mut conn = conn.clone();
            async move {
                let _: () = cmd("FLUSHDB").query_async(&mut conn).await?;
                Ok(())
            }
        })
        .await
        .map_err(|e: redis::RedisError| CacheError::L2Unreachable(e.to_string()))
    }

    async fn dbsize(&self) -> Result<u64, CacheError> {
        let conn = self.connection.clone();

        retry("redis_dbsize", &RetryConfig::query(), || {
            let mut conn = conn.clone();
            async move {
                let size: u64 = cmd("DBSIZE").query_async(&mut conn).await?;
                Ok(size)
            }
        })
        .await
        .map_err(|e: redis::RedisError| CacheError::L2Unreachable(e.to_string()))
    }

    async fn info(&self) -> Result<String, CacheError> {
        let conn = self.connection.clone();

        retry("redis_info", &RetryConfig::query(), || {
            let mut conn = conn.clone();
            async move {
                let info: String = cmd("INFO").query_async(&mut conn).await?;
                Ok(info)
            }
        })
        .await
        .map_err(|e: redis::RedisError| CacheError::L2Unreachable(e.to_string()))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let conn = self.connection.clone();

        retry("redis_ping", &RetryConfig::query(), || {
            let mut conn = conn.clone();
            async move {
                let _: String = cmd("PING").query_async(&mut conn).await?;
                Ok(())
            }
        })
        .await
        .map_err(|e: redis::RedisError| CacheError::L2Unreachable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bad_endpoint_is_config_invalid() {
        let result = RedisStore::<u32>::connect("not a url").await;

        assert!(matches!(result, Err(CacheError::ConfigInvalid(_))));
    }
}
