//! Entry envelope.
//!
//! The [`Entry`] is the unit stored in both tiers: the user value plus the
//! lifecycle metadata the placement policies decide on. The serde field
//! names form the wire contract with L2 and must stay stable.

use serde::{Deserialize, Serialize};

/// A cached value and its lifecycle metadata.
///
/// Timestamps are epoch seconds. An entry whose `expire_time` has passed is
/// treated as absent from both tiers regardless of physical presence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry<V> {
    /// The user payload.
    pub value: V,
    /// When the entry was first inserted.
    pub create_time: i64,
    /// Deadline after which the entry is invalid.
    pub expire_time: i64,
    /// Last successful read.
    pub access_time: i64,
    /// Number of successful reads.
    pub access_count: u64,
}

/// Copy snapshot of an entry's metadata, the input to placement policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    pub create_time: i64,
    pub expire_time: i64,
    pub access_time: i64,
    pub access_count: u64,
}

impl<V> Entry<V> {
    /// Build a fresh envelope inserted at `now` with the given lifetime.
    pub fn new(value: V, now: i64, ttl_secs: i64) -> Self {
        Self {
            value,
            create_time: now,
            expire_time: now + ttl_secs,
            access_time: now,
            access_count: 0,
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: i64) -> bool {
        self.expire_time <= now
    }

    /// Remaining lifetime in seconds. Non-positive once expired.
    #[must_use]
    pub fn residual_ttl(&self, now: i64) -> i64 {
        self.expire_time - now
    }

    /// Record a successful read. Counter updates are policy hints and may
    /// be lost under concurrent reads; saturate rather than wrap.
    pub fn touch(&mut self, now: i64) {
        self.access_time = now;
        self.access_count = self.access_count.saturating_add(1);
    }

    #[must_use]
    pub fn meta(&self) -> EntryMeta {
        EntryMeta {
            create_time: self.create_time,
            expire_time: self.expire_time,
            access_time: self.access_time,
            access_count: self.access_count,
        }
    }
}
