//! Shortest travel times between ground nodes.
//!
//! Only ground nodes are sources or reported destinations. Hub and line
//! nodes are waypoints.

mod compact;
mod engine;
mod table;

pub use compact::CompactGraph;
pub use engine::{PathError, ShortestPathEngine};
pub use table::{JourneyTime, TableError, all_pairs, for_each_journey, write_journey_times};

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{EdgeKey, EdgeSet, LineToken, Minutes, Node, StationId};
    use proptest::prelude::*;

    fn line(n: u8) -> LineToken {
        match n % 3 {
            0 => LineToken::Ground,
            1 => LineToken::Hub,
            _ => LineToken::line("l").unwrap(),
        }
    }

    fn edge() -> impl Strategy<Value = (EdgeKey, Minutes)> {
        (0u8..5, 0u8..3, 0u8..5, 0u8..3, 1i64..30).prop_map(|(fs, fl, ts, tl, w)| {
            let node = |s: u8, l: u8| Node::new(StationId::parse(&format!("S{s}")).unwrap(), line(l));
            (EdgeKey::new(node(fs, fl), node(ts, tl)), Minutes::new(w).unwrap())
        })
    }

    proptest! {
        /// Every row is a ground-to-ground pair between distinct stations,
        /// and no row beats a direct edge between the two ground nodes.
        #[test]
        fn rows_are_well_formed(list in prop::collection::vec(edge(), 0..40)) {
            let set: EdgeSet = list.into_iter().collect();
            let graph = CompactGraph::from_edges(&set);
            let rows = all_pairs(&graph).unwrap();

            for row in &rows {
                prop_assert_ne!(&row.from_station, &row.to_station);
                let from = Node::ground(row.from_station.clone());
                let to = Node::ground(row.to_station.clone());
                prop_assert!(graph.index_of(&from).is_some());
                prop_assert!(graph.index_of(&to).is_some());
                if let Some(direct) = set.get(&EdgeKey::new(from, to)) {
                    prop_assert!(row.time <= direct.get());
                }
            }

            let mut sorted = rows.clone();
            sorted.sort();
            prop_assert_eq!(rows, sorted);
        }
    }
}
