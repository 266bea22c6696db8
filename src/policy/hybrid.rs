// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use std::sync::Arc;

use crate::entry::EntryMeta;

use super::{DemotionPolicy, PromotionPolicy};

/// Combines several promotion policies into one.
///
/// With `require_all` the combined predicate holds only when every child
/// holds; otherwise one agreeing child suffices. An empty child list never
/// promotes.
#[derive(Debug, Clone)]
pub struct HybridPromotion {
    children: Vec<Arc<dyn PromotionPolicy>>,
    require_all: bool,
}

impl HybridPromotion {
    #[must_use]
    pub fn new(require_all: bool, children: Vec<Arc<dyn PromotionPolicy>>) -> Self {
        Self {
            children,
            require_all,
        }
    }
}

impl PromotionPolicy for HybridPromotion {
    fn should_promote(&self, meta: &EntryMeta, now: i64) -> bool {
        if self.children.is_empty() {
            return false;
        }
        if self.require_all {
            self.children.iter().all(|p| p.should_promote(meta, now))
        } else {
            self.children.iter().any(|p| p.should_promote(meta, now))
        }
    }
}

/// Combines several demotion policies into one.
///
/// Same all/any semantics as [`HybridPromotion`]; an empty child list never
/// demotes.
#[derive(Debug, Clone)]
pub struct HybridDemotion {
    children: Vec<Arc<dyn DemotionPolicy>>,
    require_all: bool,
}

impl HybridDemotion {
    #[must_use]
    pub fn new(require_all: bool, children: Vec<Arc<dyn DemotionPolicy>>) -> Self {
        Self {
            children,
            require_all,
        }
    }
}

impl DemotionPolicy for HybridDemotion {
    fn should_demote(&self, meta: &EntryMeta, now: i64) -> bool {
        if self.children.is_empty() {
            return false;
        }
        if self.require_all {
            self.children.iter().all(|p| p.should_demote(meta, now))
        } else {
            self.children.iter().any(|p| p.should_demote(meta, now))
        }
    }
}
