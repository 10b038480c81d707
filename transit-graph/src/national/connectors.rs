//! Fixed-cost connector edges.
//!
//! Line nodes only connect to each other along a service. These connectors
//! let a journey enter a station from the street, change lines through the
//! hub, and walk to an area hub shared with other feeds.

use std::collections::BTreeMap;

use tracing::debug;

use crate::catalogue::StationMetadata;
use crate::domain::{EdgeKey, EdgeSet, GraphConfig, HUB_ID_PREFIX, Minutes, Node, StationId};

use super::headway::Headways;

/// Decides whether a station's coordinates put it in an area whose hubs are
/// shared with other feeds.
pub trait AreaHubPolicy {
    fn shares_area_hub(&self, latitude: f64, longitude: f64) -> bool;
}

impl<F> AreaHubPolicy for F
where
    F: Fn(f64, f64) -> bool,
{
    fn shares_area_hub(&self, latitude: f64, longitude: f64) -> bool {
        self(latitude, longitude)
    }
}

/// An inclusive latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Greater London and its commuter fringe, where the metro feed's
    /// `HUB<CRS>` hubs live.
    pub const LONDON: BoundingBox = BoundingBox {
        min_lat: 50.5,
        max_lat: 52.2,
        min_lon: -0.6,
        max_lon: 0.3,
    };

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&latitude)
            && (self.min_lon..=self.max_lon).contains(&longitude)
    }
}

impl AreaHubPolicy for BoundingBox {
    fn shares_area_hub(&self, latitude: f64, longitude: f64) -> bool {
        self.contains(latitude, longitude)
    }
}

/// Resolve the area hub id for a station.
///
/// Stations with a CRS code and coordinates accepted by the policy share the
/// `HUB<CRS>` id; everything else gets a national hub of its own,
/// `HUBNR_<TIPLOC>`, so it cannot collide with another feed's hubs.
pub fn area_hub_id<P: AreaHubPolicy + ?Sized>(meta: &StationMetadata, policy: &P) -> StationId {
    let shared = match (meta.three_alpha, meta.coordinates()) {
        (Some(crs), Some((lat, lon))) if policy.shares_area_hub(lat, lon) => Some(crs),
        _ => None,
    };

    let id = match shared {
        Some(crs) => format!("{HUB_ID_PREFIX}{crs}"),
        None => format!("{HUB_ID_PREFIX}NR_{}", meta.tiploc),
    };
    // Both forms are non-empty by construction.
    StationId::parse(&id).unwrap_or_else(|_| meta.station_id())
}

/// Generates the connector edges of a national pass.
pub struct ConnectorSynthesizer<'a, P: ?Sized> {
    config: &'a GraphConfig,
    policy: &'a P,
}

impl<'a, P: AreaHubPolicy + ?Sized> ConnectorSynthesizer<'a, P> {
    pub fn new(config: &'a GraphConfig, policy: &'a P) -> Self {
        Self { config, policy }
    }

    /// Build every connector edge.
    ///
    /// For each station line with a headway: line→HUB at the platform cost and
    /// HUB→line at half the headway, capped, rounded up. For each used
    /// station: GROUND↔HUB and HUB↔area hub at the ground cost.
    pub fn synthesize(
        &self,
        headways: &Headways,
        stations: &BTreeMap<StationId, StationMetadata>,
    ) -> EdgeSet {
        let mut edges = EdgeSet::new();
        let platform = Minutes::from_duration(self.config.platform_to_hub()).ok();
        let ground = Minutes::from_duration(self.config.ground_to_hub()).ok();

        for ((station, line), headway) in headways {
            if !stations.contains_key(station) {
                continue;
            }
            let line_node = Node::new(station.clone(), line.clone());
            let hub = Node::hub(station.clone());

            if let Some(platform) = platform {
                edges.offer(EdgeKey::new(line_node.clone(), hub.clone()), platform);
            }
            match self.wait(*headway) {
                Some(wait) => {
                    edges.offer(EdgeKey::new(hub, line_node), wait);
                }
                None => debug!(station = %station, line = %line, headway, "Unusable headway"),
            }
        }

        let Some(ground) = ground else {
            return edges;
        };

        for (station, meta) in stations {
            let hub = Node::hub(station.clone());
            let street = Node::ground(station.clone());
            edges.offer(EdgeKey::new(street.clone(), hub.clone()), ground);
            edges.offer(EdgeKey::new(hub.clone(), street), ground);

            let area = Node::hub(area_hub_id(meta, self.policy));
            edges.offer(EdgeKey::new(area.clone(), hub.clone()), ground);
            edges.offer(EdgeKey::new(hub, area), ground);
        }

        edges
    }

    /// Expected wait for the next departure.
    pub fn wait(&self, headway: f64) -> Option<Minutes> {
        let cap = self.config.max_wait().num_seconds() as f64 / 60.0;
        Minutes::ceil((headway / 2.0).min(cap)).ok()
    }
}
