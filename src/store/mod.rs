//! Storage tiers: the process-local L1 map and the remote L2 adapter.

pub mod memory;
pub mod redis;
pub mod traits;
