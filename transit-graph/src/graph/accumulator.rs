//! Long-lived graph state accumulated across ingestion passes.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use crate::domain::{EdgeSet, MergeStats, StationId};

use super::PassOutput;
use super::record::StationRecord;

/// Result of folding one pass into the accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassMergeStats {
    pub new_stations: usize,
    pub filled_stations: usize,
    pub edges: MergeStats,
}

/// Owns the merged station catalogue and edge set.
///
/// Edges only ever get added or lowered. Stations only ever gain fields,
/// except for the two finishing steps: [`filter_synthetic_hubs`] and
/// [`disambiguate_names`].
///
/// [`filter_synthetic_hubs`]: GraphAccumulator::filter_synthetic_hubs
/// [`disambiguate_names`]: GraphAccumulator::disambiguate_names
#[derive(Debug, Clone, Default)]
pub struct GraphAccumulator {
    stations: BTreeMap<StationId, StationRecord>,
    edges: EdgeSet,
}

impl GraphAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a previously persisted graph.
    pub fn from_parts(stations: BTreeMap<StationId, StationRecord>, edges: EdgeSet) -> Self {
        Self { stations, edges }
    }

    pub fn stations(&self) -> &BTreeMap<StationId, StationRecord> {
        &self.stations
    }

    pub fn edges(&self) -> &EdgeSet {
        &self.edges
    }

    pub fn into_parts(self) -> (BTreeMap<StationId, StationRecord>, EdgeSet) {
        (self.stations, self.edges)
    }

    /// Merge station records, filling unset fields of existing entries.
    ///
    /// Returns `(new, filled)`.
    pub fn merge_stations<I>(&mut self, records: I) -> (usize, usize)
    where
        I: IntoIterator<Item = StationRecord>,
    {
        let mut new = 0;
        let mut filled = 0;
        for record in records {
            match self.stations.get_mut(&record.station_id) {
                Some(existing) => {
                    if existing.fill_from(record) {
                        filled += 1;
                    }
                }
                None => {
                    self.stations.insert(record.station_id.clone(), record);
                    new += 1;
                }
            }
        }
        (new, filled)
    }

    /// Merge edges, keeping the minimum weight per key.
    pub fn merge_edges(&mut self, edges: EdgeSet) -> MergeStats {
        self.edges.merge(edges)
    }

    /// Merge a whole ingestion pass.
    pub fn merge_pass(&mut self, pass: PassOutput) -> PassMergeStats {
        let (new_stations, filled_stations) = self.merge_stations(pass.stations);
        let edges = self.merge_edges(pass.edges);

        info!(
            new_stations,
            filled_stations,
            updates = edges.updates,
            inserts = edges.inserts,
            "Merged pass"
        );

        PassMergeStats {
            new_stations,
            filled_stations,
            edges,
        }
    }

    /// Drop every station whose id marks it as a synthetic hub. Returns the
    /// number removed.
    pub fn filter_synthetic_hubs(&mut self) -> usize {
        let before = self.stations.len();
        self.stations.retain(|id, _| !id.is_synthetic_hub());
        let removed = before - self.stations.len();
        debug!(removed, "Filtered synthetic hubs");
        removed
    }

    /// Make display names unique, ignoring case.
    ///
    /// Within each group of colliding names the lowest station id keeps its
    /// name. The others get ` [code]` appended (falling back to the TIPLOC,
    /// then the station id), and a ` #n` counter if that still collides with
    /// any name in the graph. Returns the number of stations renamed.
    pub fn disambiguate_names(&mut self) -> usize {
        let mut groups: BTreeMap<String, Vec<StationId>> = BTreeMap::new();
        for (id, record) in &self.stations {
            groups
                .entry(record.station_name.to_lowercase())
                .or_default()
                .push(id.clone());
        }

        let mut taken: HashSet<String> = groups.keys().cloned().collect();
        let mut to_rename: Vec<StationId> = groups
            .into_values()
            .filter(|ids| ids.len() > 1)
            .flat_map(|ids| ids.into_iter().skip(1))
            .collect();
        to_rename.sort();

        for id in &to_rename {
            let Some(record) = self.stations.get_mut(id) else {
                continue;
            };

            let base = format!("{} [{}]", record.station_name, record.disambiguator());
            let mut candidate = base.clone();
            let mut counter = 1;
            while taken.contains(&candidate.to_lowercase()) {
                candidate = format!("{base} #{counter}");
                counter += 1;
            }

            debug!(station = %id, from = %record.station_name, to = %candidate, "Renaming station");
            taken.insert(candidate.to_lowercase());
            record.station_name = candidate;
        }

        to_rename.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EdgeKey, Minutes, Node};

    fn id(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    fn station(s: &str, name: &str) -> StationRecord {
        StationRecord::named(id(s), name)
    }

    fn names(acc: &GraphAccumulator) -> Vec<(&str, &str)> {
        acc.stations()
            .values()
            .map(|r| (r.station_id.as_str(), r.station_name.as_str()))
            .collect()
    }

    #[test]
    fn victoria_keeps_lowest_id() {
        let mut acc = GraphAccumulator::new();
        acc.merge_stations([station("B", "Victoria"), station("A", "Victoria")]);

        assert_eq!(acc.disambiguate_names(), 1);
        assert_eq!(names(&acc), vec![("A", "Victoria"), ("B", "Victoria [B]")]);

        // Running again on identical input gives the identical answer.
        let mut again = GraphAccumulator::new();
        again.merge_stations([station("A", "Victoria"), station("B", "Victoria")]);
        again.disambiguate_names();
        assert_eq!(names(&again), names(&acc));
    }

    #[test]
    fn collision_is_case_insensitive_and_prefers_code() {
        let mut acc = GraphAccumulator::new();
        let mut rail = station("910GVICTRIC", "VICTORIA");
        rail.code = Some("VIC".to_string());
        acc.merge_stations([station("940GZZLUVIC", "Victoria"), rail]);

        acc.disambiguate_names();
        assert_eq!(
            names(&acc),
            vec![("910GVICTRIC", "VICTORIA"), ("940GZZLUVIC", "Victoria [940GZZLUVIC]")]
        );
    }

    #[test]
    fn residual_collisions_get_counters() {
        let mut acc = GraphAccumulator::new();
        let mut b = station("B", "Bank");
        b.code = Some("X".to_string());
        let mut c = station("C", "Bank");
        c.code = Some("X".to_string());
        acc.merge_stations([station("A", "Bank"), b, c, station("D", "Bank [X] #1")]);

        assert_eq!(acc.disambiguate_names(), 2);
        assert_eq!(
            names(&acc),
            vec![
                ("A", "Bank"),
                ("B", "Bank [X]"),
                ("C", "Bank [X] #2"),
                ("D", "Bank [X] #1"),
            ]
        );
    }

    #[test]
    fn hubs_are_filtered() {
        let mut acc = GraphAccumulator::new();
        acc.merge_stations([
            station("HUBKGX", "Kings Cross"),
            station("HUBNR_KNGX", "Kings Cross"),
            station("910GKNGX", "London Kings Cross"),
        ]);

        assert_eq!(acc.filter_synthetic_hubs(), 2);
        assert_eq!(names(&acc), vec![("910GKNGX", "London Kings Cross")]);
    }

    #[test]
    fn merge_fills_but_never_overwrites() {
        let mut acc = GraphAccumulator::new();
        let mut first = station("A", "Alpha");
        first.code = Some("AAA".to_string());
        acc.merge_stations([first]);

        let mut second = station("A", "Other");
        second.code = Some("ZZZ".to_string());
        second.latitude = Some(51.5);
        let (new, filled) = acc.merge_stations([second, station("B", "Beta")]);

        assert_eq!((new, filled), (1, 1));
        let a = &acc.stations()[&id("A")];
        assert_eq!(a.station_name, "Alpha");
        assert_eq!(a.code.as_deref(), Some("AAA"));
        assert_eq!(a.latitude, Some(51.5));
    }

    #[test]
    fn edge_merge_is_monotonic() {
        let key = EdgeKey::new(Node::ground(id("A")), Node::hub(id("A")));
        let set = |w: i64| -> EdgeSet { [(key.clone(), Minutes::new(w).unwrap())].into_iter().collect() };

        let mut acc = GraphAccumulator::new();
        assert_eq!(acc.merge_edges(set(10)).inserts, 1);
        let stats = acc.merge_edges(set(7));
        assert_eq!((stats.updates, stats.inserts), (1, 0));
        assert_eq!(acc.edges().get(&key).unwrap().get(), 7);

        let mut acc = GraphAccumulator::new();
        acc.merge_edges(set(10));
        let stats = acc.merge_edges(set(12));
        assert_eq!((stats.updates, stats.inserts), (0, 0));
        assert_eq!(acc.edges().get(&key).unwrap().get(), 10);
    }
}
