//! Metro (line/sequence) ingestion pass.
//!
//! Input is a list of per-line station records and ordered route sequences.
//! Each station gets a line node joined to its interchange hub; consecutive
//! stops on a sequence are joined by the collaborator's travel time; every
//! named hub gets a ground node.
//!
//! Collaborator requests are made in bounded batches. A failed request loses
//! only the edge or hub it was for.

mod config;
mod provider;

pub use config::MetroConfig;
pub use provider::{FetchError, MetroProvider, SnapshotProvider};

use std::collections::{BTreeMap, BTreeSet};

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{EdgeKey, EdgeSet, LineToken, Minutes, Node, StationId};
use crate::graph::{PassOutput, StationRecord};

/// A station as served by one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStation {
    pub station_id: StationId,
    pub station_name: String,
    pub line_id: String,

    /// Interchange this station belongs to. When absent the station is its
    /// own hub.
    #[serde(default)]
    pub hub_id: Option<StationId>,

    #[serde(default)]
    pub hub_name: Option<String>,
}

impl LineStation {
    fn hub(&self) -> &StationId {
        self.hub_id.as_ref().unwrap_or(&self.station_id)
    }

    /// The hub's name, if this record knows it.
    fn known_hub_name(&self) -> Option<&str> {
        match &self.hub_id {
            None => Some(self.station_name.as_str()),
            Some(_) => self.hub_name.as_deref(),
        }
    }
}

/// One ordered variation of a line's route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSequence {
    pub line_id: String,
    pub stop_ids: Vec<StationId>,
}

/// Everything the metro pass consumes, apart from collaborator answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetroNetwork {
    pub stations: Vec<LineStation>,
    pub sequences: Vec<RouteSequence>,
}

fn line_token(line_id: &str) -> Option<LineToken> {
    match LineToken::parse(line_id.trim()) {
        Ok(token @ LineToken::Line(_)) => Some(token),
        _ => {
            debug!(line = line_id, "Skipping unusable line id");
            None
        }
    }
}

/// Ask the provider for every hop's travel time, `batch_size` at a time.
async fn batch_travel_times<P: MetroProvider>(
    hops: &[(StationId, StationId)],
    config: &MetroConfig,
    provider: &P,
) -> BTreeMap<(StationId, StationId), Minutes> {
    let mut times = BTreeMap::new();

    for batch in hops.chunks(config.batch_size.max(1)) {
        let futures: Vec<_> = batch
            .iter()
            .map(|(from, to)| async move {
                let result = provider.travel_time(from, to).await;
                (from, to, result)
            })
            .collect();

        for (from, to, result) in join_all(futures).await {
            match result.map(Minutes::new) {
                Ok(Ok(minutes)) => {
                    times.insert((from.clone(), to.clone()), minutes);
                }
                Ok(Err(e)) => {
                    debug!(from = %from, to = %to, error = %e, "Dropping hop with unusable time");
                }
                Err(e) => {
                    debug!(from = %from, to = %to, error = %e, "Failed to fetch travel time");
                }
            }
        }
    }

    times
}

/// Ask the provider for hub names, `batch_size` at a time.
async fn batch_hub_names<P: MetroProvider>(
    hubs: &[StationId],
    config: &MetroConfig,
    provider: &P,
) -> BTreeMap<StationId, String> {
    let mut names = BTreeMap::new();

    for batch in hubs.chunks(config.batch_size.max(1)) {
        let futures: Vec<_> = batch
            .iter()
            .map(|hub| async move { (hub, provider.hub_name(hub).await) })
            .collect();

        for (hub, result) in join_all(futures).await {
            match result {
                Ok(name) if !name.trim().is_empty() => {
                    names.insert(hub.clone(), name);
                }
                Ok(_) => debug!(hub = %hub, "Hub name is blank"),
                Err(e) => debug!(hub = %hub, error = %e, "Failed to fetch hub name"),
            }
        }
    }

    names
}

/// Run the metro pass.
pub async fn build_metro_pass<P: MetroProvider>(
    network: &MetroNetwork,
    provider: &P,
    config: &MetroConfig,
) -> PassOutput {
    let mut edges = EdgeSet::new();
    let connector = match Minutes::from_duration(config.connector()) {
        Ok(m) => Some(m),
        Err(e) => {
            debug!(error = %e, "Connector cost unusable, omitting connectors");
            None
        }
    };

    // Hub name candidates, keyed by hub; the lowest station id supplying a
    // name wins.
    let mut hub_names: BTreeMap<StationId, (StationId, String)> = BTreeMap::new();
    let mut hubs: BTreeSet<StationId> = BTreeSet::new();

    for station in &network.stations {
        let Some(line) = line_token(&station.line_id) else {
            continue;
        };
        let hub = station.hub().clone();

        if let Some(cost) = connector {
            let platform = Node::new(station.station_id.clone(), line);
            edges.offer(EdgeKey::new(platform.clone(), Node::hub(hub.clone())), cost);
            edges.offer(EdgeKey::new(Node::hub(hub.clone()), platform), cost);
        }

        if let Some(name) = station.known_hub_name().filter(|n| !n.trim().is_empty()) {
            let candidate = (station.station_id.clone(), name.to_string());
            hub_names
                .entry(hub.clone())
                .and_modify(|current| {
                    if candidate.0 < current.0 {
                        *current = candidate.clone();
                    }
                })
                .or_insert_with(|| candidate.clone());
        }
        hubs.insert(hub);
    }

    let mut hops: BTreeSet<(StationId, StationId)> = BTreeSet::new();
    let mut hop_lines: BTreeMap<(StationId, StationId), BTreeSet<LineToken>> = BTreeMap::new();
    for sequence in &network.sequences {
        let Some(line) = line_token(&sequence.line_id) else {
            continue;
        };
        for pair in sequence.stop_ids.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            if from == to {
                continue;
            }
            hops.insert((from.clone(), to.clone()));
            hop_lines
                .entry((from.clone(), to.clone()))
                .or_default()
                .insert(line.clone());
        }
    }

    let hops: Vec<_> = hops.into_iter().collect();
    let times = batch_travel_times(&hops, config, provider).await;
    for ((from, to), lines) in hop_lines {
        let Some(&minutes) = times.get(&(from.clone(), to.clone())) else {
            continue;
        };
        for line in lines {
            edges.offer(
                EdgeKey::new(
                    Node::new(from.clone(), line.clone()),
                    Node::new(to.clone(), line),
                ),
                minutes,
            );
        }
    }

    let unnamed: Vec<StationId> = hubs
        .iter()
        .filter(|hub| !hub_names.contains_key(*hub))
        .cloned()
        .collect();
    let fetched = batch_hub_names(&unnamed, config, provider).await;

    let mut names: BTreeMap<StationId, String> = hub_names
        .into_iter()
        .map(|(hub, (_, name))| (hub, name))
        .collect();
    names.extend(fetched);

    let mut stations = Vec::with_capacity(names.len());
    for (hub, name) in names {
        if let Some(cost) = connector {
            edges.offer(EdgeKey::new(Node::hub(hub.clone()), Node::ground(hub.clone())), cost);
            edges.offer(EdgeKey::new(Node::ground(hub.clone()), Node::hub(hub.clone())), cost);
        }
        stations.push(StationRecord::named(hub, name));
    }

    info!(
        line_stations = network.stations.len(),
        hubs = hubs.len(),
        named_hubs = stations.len(),
        hops = hops.len(),
        timed_hops = times.len(),
        edges = edges.len(),
        "Metro pass complete"
    );

    PassOutput { stations, edges }
}
