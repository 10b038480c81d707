//! Edge construction from timetable schedules.

use std::collections::BTreeMap;

use tracing::trace;

use crate::catalogue::{StationCatalogue, StationMetadata};
use crate::domain::{
    EdgeKey, EdgeSet, GraphConfig, LineToken, Minutes, Node, ServiceVariant, StationId,
    time_of_day,
};

use super::classify::{Classification, ServiceClassifier};
use super::schedule::{Schedule, StopEvent};

/// Departure times of one line at one station, as times of day in minutes.
pub type DepartureLog = BTreeMap<(StationId, LineToken), Vec<f64>>;

/// What happened to one schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// Fewer than two usable stops.
    TooFewStops,
    /// A non-passenger service.
    Rejected,
    /// Kept; this many hops produced an edge candidate.
    Accepted { hops: usize },
}

/// Counters for one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub accepted: usize,
    pub rejected: usize,
    pub too_few_stops: usize,
    /// Hops dropped for missing times or a travel time under the guard.
    pub dropped_hops: usize,
}

/// Everything an [`EdgeBuilder`] accumulated.
#[derive(Debug, Clone, Default)]
pub struct EdgeBuildOutput {
    /// Platform-to-platform edges, minimum weight per key.
    pub edges: EdgeSet,
    pub departures: DepartureLog,
    /// Every station called at by an accepted schedule.
    pub stations: BTreeMap<StationId, StationMetadata>,
    pub stats: BuildStats,
}

/// Turns accepted schedules into directed line edges.
///
/// Each consecutive pair of stops becomes an edge
/// `(from, line) → (to, line)` weighted by the elapsed time rounded up. Only
/// the minimum weight per key is kept, so the result does not depend on the
/// order schedules are added in. Departure times are logged per station and
/// line for headway estimation.
pub struct EdgeBuilder<'a> {
    catalogue: &'a StationCatalogue,
    config: &'a GraphConfig,
    classifier: ServiceClassifier,
    output: EdgeBuildOutput,
}

impl<'a> EdgeBuilder<'a> {
    pub fn new(catalogue: &'a StationCatalogue, config: &'a GraphConfig) -> Self {
        Self {
            catalogue,
            config,
            classifier: ServiceClassifier::new(config.min_ratio_for_slow),
            output: EdgeBuildOutput::default(),
        }
    }

    /// Add every schedule, stopping early once `schedule_limit` schedules
    /// have been accepted.
    pub fn add_all<I>(&mut self, schedules: I)
    where
        I: IntoIterator<Item = Schedule>,
    {
        for schedule in schedules {
            if self
                .config
                .schedule_limit
                .is_some_and(|limit| self.output.stats.accepted >= limit)
            {
                break;
            }
            self.add_schedule(&schedule);
        }
    }

    pub fn add_schedule(&mut self, schedule: &Schedule) -> ScheduleOutcome {
        let sequence = schedule.stop_events(self.catalogue);
        if sequence.stops.len() < 2 {
            self.output.stats.too_few_stops += 1;
            return ScheduleOutcome::TooFewStops;
        }

        let speed = match self.classifier.classify(&schedule.category, sequence.stop_ratio) {
            Classification::Reject => {
                trace!(
                    operator = %schedule.operator,
                    category = %schedule.category,
                    "Dropping non-passenger schedule"
                );
                self.output.stats.rejected += 1;
                return ScheduleOutcome::Rejected;
            }
            Classification::Passenger(speed) => speed,
        };

        let variant = ServiceVariant::new(schedule.operator, speed);
        let line = LineToken::Line(variant.line_name());

        for stop in &sequence.stops {
            if !self.output.stations.contains_key(&stop.station_id)
                && let Some(meta) = self.catalogue.get(&stop.tiploc)
            {
                self.output
                    .stations
                    .insert(stop.station_id.clone(), meta.clone());
            }
        }

        let mut hops = 0;
        for pair in sequence.stops.windows(2) {
            match self.hop_weight(&pair[0], &pair[1]) {
                Some(weight) => {
                    let key = EdgeKey::new(
                        Node::new(pair[0].station_id.clone(), line.clone()),
                        Node::new(pair[1].station_id.clone(), line.clone()),
                    );
                    self.output.edges.offer(key, weight);
                    hops += 1;
                }
                None => self.output.stats.dropped_hops += 1,
            }
        }

        for stop in &sequence.stops {
            if let Some(departure) = stop.departure {
                self.output
                    .departures
                    .entry((stop.station_id.clone(), line.clone()))
                    .or_default()
                    .push(time_of_day(departure));
            }
        }

        self.output.stats.accepted += 1;
        ScheduleOutcome::Accepted { hops }
    }

    pub fn finish(self) -> EdgeBuildOutput {
        self.output
    }

    /// Weight of a hop, or `None` if it is unusable.
    fn hop_weight(&self, from: &StopEvent, to: &StopEvent) -> Option<Minutes> {
        let travel = to.arrival? - from.departure?;
        if travel < self.config.min_travel_mins {
            trace!(
                from = %from.station_id,
                to = %to.station_id,
                travel,
                "Dropping hop below minimum travel time"
            );
            return None;
        }
        Minutes::ceil(travel).ok()
    }
}
