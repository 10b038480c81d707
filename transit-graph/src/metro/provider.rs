//! The metro data collaborator and an offline, file-backed implementation.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::domain::StationId;
use crate::feed::FeedError;

use super::{LineStation, MetroNetwork, RouteSequence};

/// Failure to answer one collaborator request. Never fatal: the affected
/// edge or name is dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The collaborator has nothing for this request
    #[error("no data for {0}")]
    NoData(String),

    /// The request itself failed
    #[error("request failed: {0}")]
    Failed(String),
}

/// Answers the questions the metro pass cannot settle from its inputs.
pub trait MetroProvider {
    /// Fastest journey time in minutes between two adjacent stations.
    fn travel_time(
        &self,
        from: &StationId,
        to: &StationId,
    ) -> impl Future<Output = Result<i64, FetchError>> + Send;

    /// Display name of an interchange hub.
    fn hub_name(&self, hub: &StationId) -> impl Future<Output = Result<String, FetchError>> + Send;
}

#[derive(Debug, Clone, Deserialize)]
struct TravelTimeEntry {
    from: StationId,
    to: StationId,
    minutes: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Snapshot {
    stations: Vec<LineStation>,
    sequences: Vec<RouteSequence>,
    travel_times: Vec<TravelTimeEntry>,
    hub_names: HashMap<StationId, String>,
}

/// Serves a previously captured metro dump from a JSON file.
///
/// ```json
/// {
///   "stations": [{"station_id": "940GZZLUOXC", "station_name": "Oxford Circus", "line_id": "victoria"}],
///   "sequences": [{"line_id": "victoria", "stop_ids": ["940GZZLUOXC", "940GZZLUGPS"]}],
///   "travel_times": [{"from": "940GZZLUOXC", "to": "940GZZLUGPS", "minutes": 2}],
///   "hub_names": {"HUBKGX": "King's Cross"}
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SnapshotProvider {
    network: MetroNetwork,
    travel_times: HashMap<(StationId, StationId), i64>,
    hub_names: HashMap<StationId, String>,
}

impl SnapshotProvider {
    /// Load a snapshot file.
    pub fn load(path: &Path) -> Result<Self, FeedError> {
        let file = File::open(path).map_err(|source| FeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: Snapshot =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| FeedError::Json {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(Self::from_snapshot(snapshot))
    }

    fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut travel_times = HashMap::new();
        for entry in snapshot.travel_times {
            travel_times
                .entry((entry.from, entry.to))
                .and_modify(|m: &mut i64| *m = (*m).min(entry.minutes))
                .or_insert(entry.minutes);
        }

        Self {
            network: MetroNetwork {
                stations: snapshot.stations,
                sequences: snapshot.sequences,
            },
            travel_times,
            hub_names: snapshot.hub_names,
        }
    }

    /// The station and sequence records in the snapshot.
    pub fn network(&self) -> &MetroNetwork {
        &self.network
    }
}

impl MetroProvider for SnapshotProvider {
    async fn travel_time(&self, from: &StationId, to: &StationId) -> Result<i64, FetchError> {
        self.travel_times
            .get(&(from.clone(), to.clone()))
            .copied()
            .ok_or_else(|| FetchError::NoData(format!("{from} -> {to}")))
    }

    async fn hub_name(&self, hub: &StationId) -> Result<String, FetchError> {
        self.hub_names
            .get(hub)
            .cloned()
            .ok_or_else(|| FetchError::NoData(hub.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    #[tokio::test]
    async fn snapshot_serves_answers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metro.json");
        std::fs::write(
            &path,
            r#"{
                "stations": [
                    {"station_id": "940GZZLUOXC", "station_name": "Oxford Circus", "line_id": "victoria"}
                ],
                "sequences": [{"line_id": "victoria", "stop_ids": ["940GZZLUOXC", "940GZZLUGPS"]}],
                "travel_times": [
                    {"from": "940GZZLUOXC", "to": "940GZZLUGPS", "minutes": 3},
                    {"from": "940GZZLUOXC", "to": "940GZZLUGPS", "minutes": 2}
                ],
                "hub_names": {"HUBKGX": "King's Cross"}
            }"#,
        )
        .unwrap();

        let provider = SnapshotProvider::load(&path).unwrap();
        assert_eq!(provider.network().stations.len(), 1);
        assert_eq!(provider.network().sequences.len(), 1);

        assert_eq!(
            provider.travel_time(&id("940GZZLUOXC"), &id("940GZZLUGPS")).await,
            Ok(2)
        );
        assert!(matches!(
            provider.travel_time(&id("940GZZLUGPS"), &id("940GZZLUOXC")).await,
            Err(FetchError::NoData(_))
        ));
        assert_eq!(provider.hub_name(&id("HUBKGX")).await.unwrap(), "King's Cross");
    }

    #[test]
    fn missing_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SnapshotProvider::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, FeedError::Io { .. }));
    }
}
