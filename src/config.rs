//! Configuration for the tiered cache.
//!
//! # Example
//!
//! ```
//! use tiered_cache::CacheConfig;
//!
//! // Minimal config (uses defaults): L1 only, capped at 10k entries
//! let config = CacheConfig::default();
//! assert!(config.enable_l1);
//! assert_eq!(config.max_l1_size, 10_000);
//!
//! // Both tiers
//! let config = CacheConfig {
//!     enable_l2: true,
//!     l2_endpoint: Some("redis://localhost:6379".into()),
//!     max_l1_size: 1_000,
//!     ..Default::default()
//! };
//! ```

use std::sync::Arc;

use serde::Deserialize;

use crate::policy::{DemotionPolicy, PromotionPolicy};

/// Configuration for the tiered cache. Immutable after construction.
///
/// Scalar fields deserialize from the embedder's config format; the policy
/// handles are code-level and resolved to defaults when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Whether the process-local L1 tier participates (default: true)
    #[serde(default = "default_enable_l1")]
    pub enable_l1: bool,

    /// Whether the remote L2 tier participates (default: false)
    #[serde(default)]
    pub enable_l2: bool,

    /// Cap on L1 cardinality; 0 disables the cap (default: 10_000).
    /// The cap is approximate under concurrent writers and reconciled by
    /// the maintenance sweep.
    #[serde(default = "default_max_l1_size")]
    pub max_l1_size: usize,

    /// L2 connection string (e.g. "redis://localhost:6379").
    /// Required when `enable_l2` is set.
    #[serde(default)]
    pub l2_endpoint: Option<String>,

    /// Optional key prefix for namespacing L2 keys when sharing an
    /// instance with other applications.
    #[serde(default)]
    pub l2_key_prefix: Option<String>,

    /// Period of the background maintenance sweep in seconds (default: 60)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Promotion policy; `None` resolves to frequency (threshold 3,
    /// window 60s).
    #[serde(skip)]
    pub promotion: Option<Arc<dyn PromotionPolicy>>,

    /// Demotion policy; `None` resolves to frequency (idle 300s).
    #[serde(skip)]
    pub demotion: Option<Arc<dyn DemotionPolicy>>,
}

fn default_enable_l1() -> bool {
    true
}
fn default_max_l1_size() -> usize {
    10_000
}
fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enable_l1: default_enable_l1(),
            enable_l2: false,
            max_l1_size: default_max_l1_size(),
            l2_endpoint: None,
            l2_key_prefix: None,
            sweep_interval_secs: default_sweep_interval_secs(),
            promotion: None,
            demotion: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::FrequencyPolicy;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();

        assert!(config.enable_l1);
        assert!(!config.enable_l2);
        assert_eq!(config.max_l1_size, 10_000);
        assert_eq!(config.sweep_interval_secs, 60);
        assert!(config.l2_endpoint.is_none());
        assert!(config.promotion.is_none());
        assert!(config.demotion.is_none());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: CacheConfig = serde_json::from_str(
            r#"{"enable_l2": true, "l2_endpoint": "redis://cache:6379", "max_l1_size": 500}"#,
        )
        .unwrap();

        assert!(config.enable_l1);
        assert!(config.enable_l2);
        assert_eq!(config.max_l1_size, 500);
        assert_eq!(config.l2_endpoint.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.sweep_interval_secs, 60);
    }

    #[test]
    fn test_policy_handles_clone() {
        let config = CacheConfig {
            promotion: Some(Arc::new(FrequencyPolicy::new(5, 120, 0))),
            demotion: Some(Arc::new(FrequencyPolicy::new(0, 0, 600))),
            ..Default::default()
        };

        let cloned = config.clone();
        assert!(cloned.promotion.is_some());
        assert!(cloned.demotion.is_some());
    }
}
