//! The merged multimodal graph: accumulation across passes, finishing
//! steps, and persistence.

mod accumulator;
mod record;
mod sharded;
mod store;

pub use accumulator::{GraphAccumulator, PassMergeStats};
pub use record::{EdgeRecord, StationRecord};
pub use sharded::{DEFAULT_SHARDS, ShardedEdges, merge_passes_concurrently};
pub use store::{
    StoreError, load_edges, load_graph, load_stations, save_edges, save_graph, save_stations,
};

pub(crate) use store::JsonlWriter;

use crate::domain::EdgeSet;

/// What one ingestion pass hands to the accumulator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassOutput {
    pub stations: Vec<StationRecord>,
    pub edges: EdgeSet,
}

/// Fold several passes into an accumulator.
///
/// Edges are combined concurrently before being merged; stations are merged
/// in (id, name) order so that field filling does not depend on pass order.
pub fn merge_passes(graph: &mut GraphAccumulator, passes: Vec<PassOutput>) -> PassMergeStats {
    let mut stations = Vec::new();
    let mut edge_sets = Vec::with_capacity(passes.len());
    for pass in passes {
        stations.extend(pass.stations);
        edge_sets.push(pass.edges);
    }
    stations.sort_by(|a, b| {
        a.station_id
            .cmp(&b.station_id)
            .then_with(|| a.station_name.cmp(&b.station_name))
    });

    let edges = merge_passes_concurrently(edge_sets, DEFAULT_SHARDS);
    graph.merge_pass(PassOutput { stations, edges })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EdgeKey, Minutes, Node, StationId};

    fn id(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    fn pass(station: &str, name: &str, weight: i64) -> PassOutput {
        let key = EdgeKey::new(Node::ground(id("A")), Node::hub(id("A")));
        PassOutput {
            stations: vec![StationRecord::named(id(station), name)],
            edges: [(key, Minutes::new(weight).unwrap())].into_iter().collect(),
        }
    }

    #[test]
    fn pass_order_does_not_matter() {
        let mut forward = GraphAccumulator::new();
        merge_passes(&mut forward, vec![pass("A", "Alpha", 4), pass("B", "Beta", 3)]);

        let mut backward = GraphAccumulator::new();
        merge_passes(&mut backward, vec![pass("B", "Beta", 3), pass("A", "Alpha", 4)]);

        assert_eq!(forward.stations(), backward.stations());
        assert_eq!(forward.edges(), backward.edges());
        assert_eq!(forward.edges().len(), 1);
        assert_eq!(forward.edges().iter().next().unwrap().1.get(), 3);
    }

    #[test]
    fn merge_reports_counts() {
        let mut graph = GraphAccumulator::new();
        let first = merge_passes(&mut graph, vec![pass("A", "Alpha", 4)]);
        assert_eq!(first.new_stations, 1);
        assert_eq!(first.edges.inserts, 1);

        let second = merge_passes(&mut graph, vec![pass("A", "Alpha", 2)]);
        assert_eq!(second.new_stations, 0);
        assert_eq!(second.edges.updates, 1);
        assert_eq!(second.edges.inserts, 0);
    }
}
