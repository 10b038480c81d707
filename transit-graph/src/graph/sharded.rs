//! Keep-minimum edge accumulation safe for concurrent passes.

use std::collections::HashMap;
use std::collections::hash_map::{DefaultHasher, Entry};
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{EdgeKey, EdgeSet, MergeOutcome, MergeStats, Minutes};

/// Default number of shards.
pub const DEFAULT_SHARDS: usize = 16;

/// Edge weights split across independently locked shards.
///
/// Every key hashes to exactly one shard, so reconciling a key always happens
/// under that shard's lock while different keys proceed in parallel.
#[derive(Debug)]
pub struct ShardedEdges {
    shards: Vec<Mutex<HashMap<EdgeKey, Minutes>>>,
}

impl ShardedEdges {
    pub fn new(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Mutex::new(HashMap::new()))
            .collect();
        Self { shards }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard(&self, key: &EdgeKey) -> MutexGuard<'_, HashMap<EdgeKey, Minutes>> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() % self.shards.len() as u64) as usize;
        // Each offer is a single map operation, so a poisoned shard is still consistent.
        self.shards[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Offer a weight, keeping the smaller of old and new.
    pub fn offer(&self, key: EdgeKey, weight: Minutes) -> MergeOutcome {
        let mut shard = self.shard(&key);
        match shard.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(weight);
                MergeOutcome::Inserted
            }
            Entry::Occupied(mut slot) => {
                if weight < *slot.get() {
                    slot.insert(weight);
                    MergeOutcome::Lowered
                } else {
                    MergeOutcome::Unchanged
                }
            }
        }
    }

    /// Offer every edge of a set, spread across the rayon pool.
    pub fn offer_all(&self, edges: EdgeSet) -> MergeStats {
        let entries: Vec<(EdgeKey, Minutes)> = edges.into_iter().collect();
        entries
            .into_par_iter()
            .fold(MergeStats::default, |mut stats, (key, weight)| {
                stats.record(self.offer(key, weight));
                stats
            })
            .reduce(MergeStats::default, |a, b| MergeStats {
                updates: a.updates + b.updates,
                inserts: a.inserts + b.inserts,
            })
    }

    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collapse the shards into an ordered edge set.
    pub fn into_edge_set(self) -> EdgeSet {
        self.shards
            .into_iter()
            .flat_map(|s| s.into_inner().unwrap_or_else(PoisonError::into_inner))
            .collect()
    }
}

impl Default for ShardedEdges {
    fn default() -> Self {
        Self::new(DEFAULT_SHARDS)
    }
}

/// Fold several passes' edges together on the rayon pool.
///
/// The result is the same as merging the passes sequentially in any order.
pub fn merge_passes_concurrently(passes: Vec<EdgeSet>, shard_count: usize) -> EdgeSet {
    let sharded = ShardedEdges::new(shard_count);

    passes
        .into_par_iter()
        .enumerate()
        .for_each(|(index, pass)| {
            let offered = pass.len();
            let stats = sharded.offer_all(pass);
            debug!(
                pass = index,
                offered,
                updates = stats.updates,
                inserts = stats.inserts,
                "Pass folded"
            );
        });

    sharded.into_edge_set()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineToken, Node, StationId};

    fn key(from: &str, to: &str) -> EdgeKey {
        let line = LineToken::line("victoria").unwrap();
        EdgeKey::new(
            Node::new(StationId::parse(from).unwrap(), line.clone()),
            Node::new(StationId::parse(to).unwrap(), line),
        )
    }

    fn mins(m: i64) -> Minutes {
        Minutes::new(m).unwrap()
    }

    #[test]
    fn offer_keeps_minimum() {
        let sharded = ShardedEdges::new(4);
        assert_eq!(sharded.offer(key("A", "B"), mins(10)), MergeOutcome::Inserted);
        assert_eq!(sharded.offer(key("A", "B"), mins(7)), MergeOutcome::Lowered);
        assert_eq!(sharded.offer(key("A", "B"), mins(12)), MergeOutcome::Unchanged);
        assert_eq!(sharded.len(), 1);

        let set = sharded.into_edge_set();
        assert_eq!(set.get(&key("A", "B")), Some(mins(7)));
    }

    #[test]
    fn offer_all_counts_outcomes() {
        let sharded = ShardedEdges::new(2);
        sharded.offer(key("A", "B"), mins(10));
        sharded.offer(key("B", "C"), mins(1));

        let pass: EdgeSet = [
            (key("A", "B"), mins(4)),
            (key("B", "C"), mins(6)),
            (key("C", "D"), mins(2)),
        ]
        .into_iter()
        .collect();
        let stats = sharded.offer_all(pass);
        assert_eq!(stats, MergeStats { updates: 1, inserts: 1 });
        assert_eq!(sharded.len(), 3);
    }

    #[test]
    fn zero_shards_means_one() {
        assert_eq!(ShardedEdges::new(0).shard_count(), 1);
    }

    #[test]
    fn concurrent_matches_sequential() {
        let a: EdgeSet = [(key("A", "B"), mins(5)), (key("B", "C"), mins(9))]
            .into_iter()
            .collect();
        let b: EdgeSet = [(key("A", "B"), mins(3)), (key("C", "D"), mins(4))]
            .into_iter()
            .collect();
        let c: EdgeSet = [(key("B", "C"), mins(11)), (key("A", "B"), mins(8))]
            .into_iter()
            .collect();

        let mut sequential = EdgeSet::new();
        sequential.merge(a.clone());
        sequential.merge(b.clone());
        sequential.merge(c.clone());

        let concurrent = merge_passes_concurrently(vec![c, a, b], 3);
        assert_eq!(concurrent, sequential);
        assert_eq!(concurrent.get(&key("A", "B")), Some(mins(3)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{LineToken, Node, StationId};
    use proptest::prelude::*;

    fn edge() -> impl Strategy<Value = (EdgeKey, Minutes)> {
        (0u8..6, 0u8..6, 1i64..60).prop_map(|(from, to, w)| {
            let node = |n: u8| Node::new(StationId::parse(&format!("S{n}")).unwrap(), LineToken::Hub);
            (EdgeKey::new(node(from), node(to)), Minutes::new(w).unwrap())
        })
    }

    proptest! {
        /// Splitting edges across concurrent passes never changes the result.
        #[test]
        fn concurrent_merge_order_independent(
            passes in prop::collection::vec(prop::collection::vec(edge(), 0..20), 1..5),
            shards in 1usize..8,
        ) {
            let sets: Vec<EdgeSet> = passes
                .into_iter()
                .map(|p| p.into_iter().collect())
                .collect();

            let mut sequential = EdgeSet::new();
            for set in sets.iter().rev() {
                sequential.merge(set.clone());
            }

            prop_assert_eq!(merge_passes_concurrently(sets, shards), sequential);
        }
    }
}
