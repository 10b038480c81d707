//! National rail graph pass.
//!
//! Streams timetable schedules, classifies each into an operator's slow or
//! express variant, and emits:
//! - platform-to-platform edges along each service,
//! - line↔hub edges weighted by the observed headway,
//! - ground↔hub and hub↔area hub connectors for every station used.

mod builder;
mod classify;
mod connectors;
mod headway;
mod schedule;

pub use builder::{BuildStats, DepartureLog, EdgeBuildOutput, EdgeBuilder, ScheduleOutcome};
pub use classify::{Classification, NON_PASSENGER_CATEGORIES, ServiceClassifier};
pub use connectors::{AreaHubPolicy, BoundingBox, ConnectorSynthesizer, area_hub_id};
pub use headway::{HeadwayEstimator, Headways};
pub use schedule::{Schedule, StopEvent, StopSequence, TimingPoint};

use std::collections::BTreeMap;

use tracing::info;

use crate::catalogue::{StationCatalogue, StationMetadata};
use crate::domain::{EdgeSet, GraphConfig, StationId};
use crate::graph::{PassOutput, StationRecord};

/// Result of a national pass.
#[derive(Debug, Clone, Default)]
pub struct NationalGraph {
    pub edges: EdgeSet,
    pub headways: Headways,
    pub stations: BTreeMap<StationId, StationMetadata>,
    pub stats: BuildStats,
}

impl NationalGraph {
    /// Station records and edges, ready to merge into the graph.
    pub fn into_pass(self) -> PassOutput {
        PassOutput {
            stations: self
                .stations
                .values()
                .map(StationRecord::from_metadata)
                .collect(),
            edges: self.edges,
        }
    }
}

/// Build the national rail edges for a stream of schedules.
pub fn build_national_graph<I, P>(
    catalogue: &StationCatalogue,
    schedules: I,
    config: &GraphConfig,
    policy: &P,
) -> NationalGraph
where
    I: IntoIterator<Item = Schedule>,
    P: AreaHubPolicy + ?Sized,
{
    let mut builder = EdgeBuilder::new(catalogue, config);
    builder.add_all(schedules);
    let EdgeBuildOutput {
        mut edges,
        departures,
        stations,
        stats,
    } = builder.finish();

    let headways = HeadwayEstimator::new(config.fallback_headway_mins).estimate_all(&departures);
    let platform_edges = edges.len();

    let connectors = ConnectorSynthesizer::new(config, policy).synthesize(&headways, &stations);
    edges.merge(connectors);

    info!(
        accepted = stats.accepted,
        rejected = stats.rejected,
        too_few_stops = stats.too_few_stops,
        dropped_hops = stats.dropped_hops,
        platform_edges,
        total_edges = edges.len(),
        stations = stations.len(),
        "National pass complete"
    );

    NationalGraph {
        edges,
        headways,
        stations,
        stats,
    }
}
