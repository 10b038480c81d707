//! Directed, weighted edges and the keep-minimum edge set.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::Duration;

use super::error::DomainError;
use super::node::Node;

/// Composite key of a directed edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub from: Node,
    pub to: Node,
}

impl EdgeKey {
    pub fn new(from: Node, to: Node) -> Self {
        Self { from, to }
    }
}

/// Edge weight in whole minutes. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Minutes(u32);

impl Minutes {
    pub fn new(value: i64) -> Result<Self, DomainError> {
        match u32::try_from(value) {
            Ok(v) if v > 0 => Ok(Minutes(v)),
            _ => Err(DomainError::InvalidWeight(value)),
        }
    }

    /// Round a fractional duration up to whole minutes.
    ///
    /// ```
    /// use transit_graph::domain::Minutes;
    ///
    /// assert_eq!(Minutes::ceil(4.5).unwrap().get(), 5);
    /// assert_eq!(Minutes::ceil(0.25).unwrap().get(), 1);
    /// assert!(Minutes::ceil(0.0).is_err());
    /// ```
    pub fn ceil(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() || value <= 0.0 || value > f64::from(u32::MAX) {
            return Err(DomainError::InvalidWeight(value as i64));
        }
        Ok(Minutes(value.ceil() as u32))
    }

    /// Whole minutes covering `duration`, rounded up.
    pub fn from_duration(duration: Duration) -> Result<Self, DomainError> {
        let secs = duration.num_seconds();
        if secs <= 0 {
            return Err(DomainError::InvalidWeight(duration.num_minutes()));
        }
        Self::new((secs + 59) / 60)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// What happened to the stored weight when an edge was offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The key was new.
    Inserted,
    /// The key existed with a larger weight, which was lowered.
    Lowered,
    /// The key existed with an equal or smaller weight.
    Unchanged,
}

/// Counts of weight updates versus new inserts across a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub updates: usize,
    pub inserts: usize,
}

impl MergeStats {
    pub fn record(&mut self, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::Inserted => self.inserts += 1,
            MergeOutcome::Lowered => self.updates += 1,
            MergeOutcome::Unchanged => {}
        }
    }
}

/// A collection of edges where each key holds the minimum weight ever offered.
///
/// Offering is monotonically non-increasing per key and idempotent, so the
/// contents never depend on the order edges arrive in. Iteration is in key
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeSet {
    edges: BTreeMap<EdgeKey, Minutes>,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a weight for a key, keeping the smaller of old and new.
    pub fn offer(&mut self, key: EdgeKey, weight: Minutes) -> MergeOutcome {
        match self.edges.entry(key) {
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

    /// Offer every edge of `other`.
    pub fn merge(&mut self, other: EdgeSet) -> MergeStats {
        let mut stats = MergeStats::default();
        for (key, weight) in other.edges {
            stats.record(self.offer(key, weight));
        }
        stats
    }

    pub fn get(&self, key: &EdgeKey) -> Option<Minutes> {
        self.edges.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EdgeKey, Minutes)> {
        self.edges.iter().map(|(k, w)| (k, *w))
    }
}

impl IntoIterator for EdgeSet {
    type Item = (EdgeKey, Minutes);
    type IntoIter = std::collections::btree_map::IntoIter<EdgeKey, Minutes>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.into_iter()
    }
}

impl FromIterator<(EdgeKey, Minutes)> for EdgeSet {
    fn from_iter<I: IntoIterator<Item = (EdgeKey, Minutes)>>(iter: I) -> Self {
        let mut set = EdgeSet::new();
        for (key, weight) in iter {
            set.offer(key, weight);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineToken, StationId};

    fn key(from: &str, to: &str) -> EdgeKey {
        let line = LineToken::parse("victoria").unwrap();
        EdgeKey::new(
            Node::new(StationId::parse(from).unwrap(), line.clone()),
            Node::new(StationId::parse(to).unwrap(), line),
        )
    }

    fn mins(v: i64) -> Minutes {
        Minutes::new(v).unwrap()
    }

    #[test]
    fn minutes_reject_non_positive() {
        assert_eq!(Minutes::new(0), Err(DomainError::InvalidWeight(0)));
        assert_eq!(Minutes::new(-3), Err(DomainError::InvalidWeight(-3)));
        assert!(Minutes::ceil(f64::NAN).is_err());
        assert_eq!(Minutes::ceil(2.0).unwrap().get(), 2);
    }

    #[test]
    fn minutes_from_duration_round_up() {
        assert_eq!(Minutes::from_duration(Duration::minutes(2)), Ok(mins(2)));
        assert_eq!(Minutes::from_duration(Duration::seconds(61)), Ok(mins(2)));
        assert_eq!(Minutes::from_duration(Duration::seconds(1)), Ok(mins(1)));
        assert_eq!(
            Minutes::from_duration(Duration::zero()),
            Err(DomainError::InvalidWeight(0))
        );
    }

    #[test]
    fn lower_weight_replaces() {
        let mut set = EdgeSet::new();
        assert_eq!(set.offer(key("A", "B"), mins(10)), MergeOutcome::Inserted);
        assert_eq!(set.offer(key("A", "B"), mins(7)), MergeOutcome::Lowered);
        assert_eq!(set.get(&key("A", "B")), Some(mins(7)));
    }

    #[test]
    fn higher_weight_ignored() {
        let mut set = EdgeSet::new();
        set.offer(key("A", "B"), mins(10));
        assert_eq!(set.offer(key("A", "B"), mins(12)), MergeOutcome::Unchanged);
        assert_eq!(set.get(&key("A", "B")), Some(mins(10)));
    }

    #[test]
    fn merge_counts_updates_and_inserts() {
        let mut base = EdgeSet::new();
        base.offer(key("A", "B"), mins(10));
        base.offer(key("B", "C"), mins(4));

        let incoming: EdgeSet = [
            (key("A", "B"), mins(8)),
            (key("B", "C"), mins(6)),
            (key("C", "D"), mins(3)),
        ]
        .into_iter()
        .collect();

        let stats = base.merge(incoming);
        assert_eq!(stats, MergeStats { updates: 1, inserts: 1 });
        assert_eq!(base.len(), 3);
        assert_eq!(base.get(&key("A", "B")), Some(mins(8)));
        assert_eq!(base.get(&key("B", "C")), Some(mins(4)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{LineToken, StationId};
    use proptest::prelude::*;

    fn key(i: u8) -> EdgeKey {
        let line = LineToken::Hub;
        EdgeKey::new(
            Node::new(StationId::parse(&format!("S{i}")).unwrap(), line.clone()),
            Node::new(StationId::parse("T").unwrap(), line),
        )
    }

    proptest! {
        /// The stored weight is the minimum offered, whatever the order
        #[test]
        fn keeps_minimum(weights in prop::collection::vec(1u32..500, 1..20)) {
            let mut set = EdgeSet::new();
            for w in &weights {
                set.offer(key(0), Minutes::new(i64::from(*w)).unwrap());
            }
            let min = *weights.iter().min().unwrap();
            prop_assert_eq!(set.get(&key(0)).unwrap().get(), min);
        }

        /// Merging a set into itself changes nothing
        #[test]
        fn merge_idempotent(entries in prop::collection::vec((0u8..10, 1u32..100), 0..30)) {
            let set: EdgeSet = entries
                .iter()
                .map(|(k, w)| (key(*k), Minutes::new(i64::from(*w)).unwrap()))
                .collect();
            let mut merged = set.clone();
            let stats = merged.merge(set.clone());
            prop_assert_eq!(stats, MergeStats::default());
            prop_assert_eq!(merged, set);
        }

        /// Offer order does not affect the result
        #[test]
        fn order_independent(entries in prop::collection::vec((0u8..10, 1u32..100), 0..30)) {
            let forward: EdgeSet = entries
                .iter()
                .map(|(k, w)| (key(*k), Minutes::new(i64::from(*w)).unwrap()))
                .collect();
            let backward: EdgeSet = entries
                .iter()
                .rev()
                .map(|(k, w)| (key(*k), Minutes::new(i64::from(*w)).unwrap()))
                .collect();
            prop_assert_eq!(forward, backward);
        }
    }
}
