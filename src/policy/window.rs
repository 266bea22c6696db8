// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use crate::entry::EntryMeta;

use super::{DemotionPolicy, PromotionPolicy};

/// Sliding time-window policy.
///
/// Promotes an entry with `threshold` accumulated reads whose last access
/// falls inside the trailing `window` seconds; demotes an entry idle for at
/// least `idle_threshold` seconds. A parameter of 0 disables the
/// corresponding predicate.
///
/// Unlike [`FrequencyPolicy`](super::FrequencyPolicy), the window trails
/// `now` rather than being anchored at creation, so long-lived entries can
/// still qualify while they stay active.
#[derive(Debug, Clone, Copy)]
pub struct WindowPolicy {
    threshold: u64,
    window: u64,
    idle_threshold: u64,
}

impl WindowPolicy {
    #[must_use]
    pub fn new(threshold: u64, window: u64, idle_threshold: u64) -> Self {
        Self {
            threshold,
            window,
            idle_threshold,
        }
    }
}

impl PromotionPolicy for WindowPolicy {
    fn should_promote(&self, meta: &EntryMeta, now: i64) -> bool {
        self.threshold > 0
            && self.window > 0
            && meta.access_time >= now - self.window as i64
            && meta.access_count >= self.threshold
    }
}

impl DemotionPolicy for WindowPolicy {
    fn should_demote(&self, meta: &EntryMeta, now: i64) -> bool {
        self.idle_threshold > 0 && now - meta.access_time >= self.idle_threshold as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(access: i64, count: u64) -> EntryMeta {
        EntryMeta {
            create_time: 0,
            expire_time: 10_000,
            access_time: access,
            access_count: count,
        }
    }

    #[test]
    fn test_promote_recent_access_at_threshold() {
        let policy = WindowPolicy::new(5, 120, 0);

        assert!(policy.should_promote(&meta(900, 5), 1000));
        // Window edge is inclusive.
        assert!(policy.should_promote(&meta(880, 5), 1000));
    }

    #[test]
    fn test_no_promote_stale_access() {
        let policy = WindowPolicy::new(5, 120, 0);

        assert!(!policy.should_promote(&meta(879, 50), 1000));
    }

    #[test]
    fn test_no_promote_below_threshold() {
        let policy = WindowPolicy::new(5, 120, 0);

        assert!(!policy.should_promote(&meta(999, 4), 1000));
    }

    #[test]
    fn test_old_entry_still_promotable_when_active() {
        // Created long ago, but reads keep landing inside the window.
        let policy = WindowPolicy::new(3, 60, 0);
        let meta = EntryMeta {
            create_time: 0,
            expire_time: 1_000_000,
            access_time: 99_990,
            access_count: 3,
        };

        assert!(policy.should_promote(&meta, 100_000));
    }

    #[test]
    fn test_demote_idle_boundary() {
        let policy = WindowPolicy::new(0, 0, 60);

        assert!(!policy.should_demote(&meta(100, 1), 159));
        assert!(policy.should_demote(&meta(100, 1), 160));
    }

    #[test]
    fn test_zero_parameters_disable_predicates() {
        assert!(!WindowPolicy::new(0, 60, 0).should_promote(&meta(1000, 100), 1000));
        assert!(!WindowPolicy::new(5, 0, 0).should_promote(&meta(1000, 100), 1000));
        assert!(!WindowPolicy::new(0, 0, 0).should_demote(&meta(0, 0), i64::MAX));
    }
}
