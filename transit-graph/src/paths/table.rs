//! The all-pairs ground-to-ground journey time table.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::StationId;
use crate::graph::{JsonlWriter, StoreError};

use super::compact::CompactGraph;
use super::engine::{PathError, ShortestPathEngine};

/// One line of `shortest_paths.jsonl`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JourneyTime {
    pub from_station: StationId,
    pub to_station: StationId,
    pub time: u32,
}

/// Borrowed form of [`JourneyTime`] used while writing.
#[derive(Serialize)]
struct JourneyRow<'a> {
    from_station: &'a StationId,
    to_station: &'a StationId,
    time: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error(transparent)]
    Paths(#[from] PathError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Visit the shortest time between every ordered pair of ground nodes.
///
/// Self pairs and unreachable pairs are left out. Pairs arrive sorted by
/// `(from_station, to_station)`. Returns the number visited.
pub fn for_each_journey<E, F>(graph: &CompactGraph, mut visit: F) -> Result<usize, E>
where
    E: From<PathError>,
    F: FnMut(&StationId, &StationId, u32) -> Result<(), E>,
{
    let grounds = graph.ground_nodes();
    let mut engine = ShortestPathEngine::new(graph);
    let mut rows = 0;

    for &source in &grounds {
        engine.reset();
        engine.start_index(source)?;
        engine.run()?;
        let dist = engine.distances()?;

        let from = &graph.node(source).station;
        let before = rows;
        for &target in &grounds {
            if target == source {
                continue;
            }
            if let Some(time) = dist[target] {
                visit(from, &graph.node(target).station, time)?;
                rows += 1;
            }
        }
        debug!(source = %from, reachable = rows - before, "Source done");
    }

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        sources = grounds.len(),
        rows,
        "All-pairs shortest paths complete"
    );
    Ok(rows)
}

/// Collect the whole table in memory.
pub fn all_pairs(graph: &CompactGraph) -> Result<Vec<JourneyTime>, PathError> {
    let mut rows = Vec::new();
    for_each_journey(graph, |from, to, time| {
        rows.push(JourneyTime {
            from_station: from.clone(),
            to_station: to.clone(),
            time,
        });
        Ok::<_, PathError>(())
    })?;
    Ok(rows)
}

/// Solve and write the journey table one row at a time.
pub fn write_journey_times(path: &Path, graph: &CompactGraph) -> Result<usize, TableError> {
    let mut writer = JsonlWriter::create(path)?;
    let rows = for_each_journey(graph, |from_station, to_station, time| {
        writer
            .write(&JourneyRow {
                from_station,
                to_station,
                time,
            })
            .map_err(TableError::from)
    })?;
    writer.finish()?;
    Ok(rows)
}
