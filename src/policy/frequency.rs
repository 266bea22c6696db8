// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use crate::entry::EntryMeta;

use super::{DemotionPolicy, PromotionPolicy};

/// Access-frequency policy.
///
/// Promotes an entry that accumulated `threshold` reads within `window`
/// seconds of its creation; demotes an entry idle for at least `idle`
/// seconds. A parameter of 0 disables the corresponding predicate.
#[derive(Debug, Clone, Copy)]
pub struct FrequencyPolicy {
    threshold: u64,
    window: u64,
    idle: u64,
}

impl FrequencyPolicy {
    #[must_use]
    pub fn new(threshold: u64, window: u64, idle: u64) -> Self {
        Self {
            threshold,
            window,
            idle,
        }
    }
}

impl PromotionPolicy for FrequencyPolicy {
    fn should_promote(&self, meta: &EntryMeta, now: i64) -> bool {
        self.threshold > 0
            && self.window > 0
            && now - meta.create_time <= self.window as i64
            && meta.access_count >= self.threshold
    }
}

impl DemotionPolicy for FrequencyPolicy {
    fn should_demote(&self, meta: &EntryMeta, now: i64) -> bool {
        self.idle > 0 && now - meta.access_time >= self.idle as i64
    }
}
