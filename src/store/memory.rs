use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;

use crate::entry::Entry;

/// Outcome of a metadata-updating L1 lookup.
pub enum Lookup<V> {
    /// Live entry; carries a copy taken after the metadata update.
    Hit(Entry<V>),
    /// Present but past its deadline. The caller removes it.
    Expired,
    Miss,
}

/// The process-local L1 tier: a sharded concurrent map of owned envelopes
/// plus an approximate item counter.
///
/// The counter is maintained with relaxed atomics on insert/remove, so it
/// can drift from the true cardinality under races; the maintenance sweep
/// reconciles it against the map. No method holds a shard guard across an
/// await point.
pub struct LocalStore<V> {
    entries: DashMap<String, Entry<V>>,
    item_count: AtomicUsize,
}

impl<V: Clone> LocalStore<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            item_count: AtomicUsize::new(0),
        }
    }

    /// Copy out the entry without touching its metadata.
    pub fn get(&self, key: &str) -> Option<Entry<V>> {
        self.entries.get(key).map(|r| r.value().clone())
    }

    /// Look up `key` at time `now`, recording the read on a live hit.
    /// The metadata update happens under the shard guard; the guard is
    /// released before this returns.
    pub fn touch(&self, key: &str, now: i64) -> Lookup<V> {
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                if entry.is_expired(now) {
                    Lookup::Expired
                } else {
                    entry.touch(now);
                    Lookup::Hit(entry.clone())
                }
            }
            None => Lookup::Miss,
        }
    }

    /// Upsert. Returns true when the key was newly inserted.
    pub fn insert(&self, key: String, entry: Entry<V>) -> bool {
        let newly = self.entries.insert(key, entry).is_none();
        if newly {
            self.item_count.fetch_add(1, Ordering::Relaxed);
        }
        newly
    }

    /// Idempotent removal. Returns true when the key was present.
    pub fn remove(&self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.item_count.fetch_sub(1, Ordering::Relaxed);
        }
        removed
    }

    /// Remove `key` only if its `access_time` still matches a snapshot
    /// taken earlier. Lets eviction and demotion skip entries a concurrent
    /// reader touched in the meantime.
    pub fn remove_if_untouched(&self, key: &str, access_time: i64) -> bool {
        let removed = self
            .entries
            .remove_if(key, |_, entry| entry.access_time == access_time)
            .is_some();
        if removed {
            self.item_count.fetch_sub(1, Ordering::Relaxed);
        }
        removed
    }

    /// Copy out all entries. Safe to take while other operations proceed;
    /// the result is a point-in-time-ish view, not a consistent snapshot.
    pub fn snapshot(&self) -> Vec<(String, Entry<V>)> {
        self.entries
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }

    /// Approximate cardinality.
    pub fn count(&self) -> usize {
        self.item_count.load(Ordering::Relaxed)
    }

    /// Snap the counter back to the map's true length.
    pub fn reconcile_count(&self) -> usize {
        let len = self.entries.len();
        self.item_count.store(len, Ordering::Relaxed);
        len
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.item_count.store(0, Ordering::Relaxed);
    }
}

impl<V: Clone> Default for LocalStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the `n` least-recently-used entries from a snapshot.
///
/// Ascending by `access_time`, ties broken by `create_time` then key, so
/// the order is deterministic over a quiescent store.
pub fn lru_victims<V: Clone>(
    snapshot: &[(String, Entry<V>)],
    n: usize,
) -> Vec<(String, Entry<V>)> {
    let mut ordered: Vec<&(String, Entry<V>)> = snapshot.iter().collect();
    ordered.sort_by(|(ka, a), (kb, b)| {
        a.access_time
            .cmp(&b.access_time)
            .then(a.create_time.cmp(&b.create_time))
            .then(ka.cmp(kb))
    });
    ordered.into_iter().take(n).cloned().collect()
}
