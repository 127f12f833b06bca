//! Time-bounded memo of computed edge risks

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use itertools::Itertools;

use crate::model::GraphKey;
use crate::NodeId;

/// Identifies one directed edge of one graph.
///
/// The edge index disambiguates parallel edges between the same nodes; the
/// graph key keeps networks of the same region apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeWeightKey {
    pub graph: GraphKey,
    pub from: NodeId,
    pub to: NodeId,
    pub edge: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedWeight {
    pub weight: f64,
    /// Milliseconds since the Unix epoch
    pub computed_at_ms: i64,
}

impl CachedWeight {
    pub fn is_fresh(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms.saturating_sub(self.computed_at_ms) < ttl_ms
    }
}

/// Shared across requests. An entry is reused while
/// `now - computed_at < ttl`; expired entries are replaced on next use.
///
/// Insertion goes through the map entry, so concurrent requests for the same
/// key compute it at most once per expiry.
#[derive(Debug)]
pub struct EdgeWeightCache {
    ttl_ms: i64,
    entries: DashMap<EdgeWeightKey, CachedWeight>,
    computations: AtomicU64,
}

impl EdgeWeightCache {
    pub fn new(ttl: chrono::TimeDelta) -> Self {
        Self {
            ttl_ms: ttl.num_milliseconds(),
            entries: DashMap::new(),
            computations: AtomicU64::new(0),
        }
    }

    pub fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }

    /// Fresh cached weight, or the result of `compute` stored at `now_ms`.
    pub fn get_or_compute(
        &self,
        key: EdgeWeightKey,
        now_ms: i64,
        compute: impl FnOnce() -> f64,
    ) -> f64 {
        match self.entries.entry(key) {
            Entry::Occupied(mut entry) => {
                if entry.get().is_fresh(now_ms, self.ttl_ms) {
                    return entry.get().weight;
                }
                let weight = self.run(compute);
                entry.insert(CachedWeight {
                    weight,
                    computed_at_ms: now_ms,
                });
                weight
            }
            Entry::Vacant(entry) => {
                let weight = self.run(compute);
                entry.insert(CachedWeight {
                    weight,
                    computed_at_ms: now_ms,
                });
                weight
            }
        }
    }

    fn run(&self, compute: impl FnOnce() -> f64) -> f64 {
        self.computations.fetch_add(1, Ordering::Relaxed);
        compute()
    }

    /// Cached weight if still fresh at `now_ms`.
    pub fn get(&self, key: &EdgeWeightKey, now_ms: i64) -> Option<f64> {
        self.entries
            .get(key)
            .filter(|cached| cached.is_fresh(now_ms, self.ttl_ms))
            .map(|cached| cached.weight)
    }

    /// All entries, fresh or not, ordered by key.
    pub fn snapshot(&self) -> Vec<(EdgeWeightKey, CachedWeight)> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .sorted_by(|a, b| a.0.cmp(&b.0))
            .collect()
    }

    /// Drops expired entries and returns how many were removed.
    pub fn purge_expired(&self, now_ms: i64) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, cached| cached.is_fresh(now_ms, self.ttl_ms));
        before.saturating_sub(self.entries.len())
    }

    /// Number of times a weight was computed rather than served from cache.
    pub fn computations(&self) -> u64 {
        self.computations.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeDelta;

    use super::*;
    use crate::model::NetworkType;

    fn key(edge: usize) -> EdgeWeightKey {
        EdgeWeightKey {
            graph: GraphKey::new("Dhaka", NetworkType::Walk),
            from: 1,
            to: 2,
            edge,
        }
    }

    #[test]
    fn reuses_until_ttl_then_recomputes() {
        let cache = EdgeWeightCache::new(TimeDelta::seconds(10));

        assert_eq!(cache.get_or_compute(key(0), 0, || 5.0), 5.0);
        assert_eq!(cache.get_or_compute(key(0), 9_999, || 7.0), 5.0);
        assert_eq!(cache.computations(), 1);

        // now - computed_at == ttl is already stale
        assert_eq!(cache.get_or_compute(key(0), 10_000, || 7.0), 7.0);
        assert_eq!(cache.computations(), 2);
        assert_eq!(cache.get(&key(0), 10_001), Some(7.0));
    }

    #[test]
    fn parallel_edges_and_networks_are_distinct() {
        let cache = EdgeWeightCache::new(TimeDelta::minutes(30));
        cache.get_or_compute(key(0), 0, || 1.0);
        cache.get_or_compute(key(1), 0, || 2.0);

        let mut bike = key(0);
        bike.graph = GraphKey::new("Dhaka", NetworkType::Bike);
        cache.get_or_compute(bike.clone(), 0, || 3.0);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(&bike, 1), Some(3.0));
        let weights: Vec<_> = cache.snapshot().iter().map(|(_, c)| c.weight).collect();
        assert_eq!(weights.len(), 3);
    }

    #[test]
    fn purge_drops_only_expired() {
        let cache = EdgeWeightCache::new(TimeDelta::seconds(1));
        cache.get_or_compute(key(0), 0, || 1.0);
        cache.get_or_compute(key(1), 900, || 1.0);
        assert_eq!(cache.purge_expired(1_500), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key(0), 1_500).is_none());
    }

    #[test]
    fn concurrent_callers_compute_once() {
        let cache = Arc::new(EdgeWeightCache::new(TimeDelta::minutes(30)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.get_or_compute(key(0), 0, || 4.0))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 4.0);
        }
        assert_eq!(cache.computations(), 1);
    }
}
