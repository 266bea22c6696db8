//! # Tiered Cache
//!
//! A two-tier key-value cache for read-heavy, high-concurrency services.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TieredCache<V>                         │
//! │  • set / get / get_with_ttl / delete / clear / stats        │
//! │  • read-through, write-through across enabled tiers        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   L1: In-Memory Store                       │
//! │  • DashMap for concurrent access                           │
//! │  • Bounded hot set, LRU spill on capacity overshoot        │
//! │  • Swept periodically: expiry purge + policy demotion      │
//! └─────────────────────────────────────────────────────────────┘
//!               promotion ▲          │ demotion / spill
//!                         │          ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    L2: Redis Store                          │
//! │  • Shared across processes, larger and slower              │
//! │  • Envelopes serialized with server-side TTL backstop      │
//! │  • Survives restarts; L1 is rebuilt by promotion traffic   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tiered_cache::{TieredCache, CacheConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = CacheConfig {
//!         enable_l2: true,
//!         l2_endpoint: Some("redis://localhost:6379".into()),
//!         max_l1_size: 10_000,
//!         ..Default::default()
//!     };
//!
//!     let cache: TieredCache<serde_json::Value> =
//!         TieredCache::connect(config).await.expect("failed to connect");
//!
//!     cache.set("user.1", json!({"name": "Alice"}), 300).await.unwrap();
//!
//!     // L1 first, then L2 with promotion of hot entries
//!     if let Some(value) = cache.get("user.1").await {
//!         println!("found: {}", value);
//!     }
//!
//!     cache.close().await.unwrap();
//! }
//! ```
//!
//! ## Placement
//!
//! Entries carry lifecycle metadata (creation, expiry, last access,
//! access count). A [`PromotionPolicy`] decides when an L2 hit is copied
//! up into L1; a [`DemotionPolicy`] decides when the background sweep
//! spills an idle L1 entry down. Both families ship frequency and
//! time-window variants plus all/any combinators, and both are open for
//! custom implementations.
//!
//! ## Consistency
//!
//! Tiers are updated best-effort in sequence; there is no cross-tier
//! transaction, so L1 and L2 may briefly disagree after a write. Access
//! metadata is updated without synchronization and may lose counts under
//! concurrent reads; it feeds policy decisions, not accounting.
//!
//! ## Modules
//!
//! - [`cache`]: the [`TieredCache`] orchestrator
//! - [`store`]: the L1 map and the L2 Redis adapter
//! - [`policy`]: promotion/demotion policies
//! - [`entry`]: the envelope stored in both tiers
//! - [`clock`]: injectable time source
//! - [`retry`]: backoff helper for L2 commands
//! - [`metrics`]: instrumentation via the `metrics` facade

pub mod cache;
pub mod clock;
pub mod config;
pub mod entry;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod retry;
pub mod store;

pub use cache::TieredCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use entry::{Entry, EntryMeta};
pub use error::CacheError;
pub use policy::{
    DemotionPolicy, FrequencyPolicy, HybridDemotion, HybridPromotion, PromotionPolicy,
    WindowPolicy,
};
pub use store::memory::LocalStore;
pub use store::redis::RedisStore;
pub use store::traits::RemoteStore;
