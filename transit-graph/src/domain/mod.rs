//! Domain types for the transit graph builder.
//!
//! This module contains the validated value types shared by every stage of
//! the build: station codes, graph nodes and edges, timetable times, and the
//! build configuration. Types enforce their invariants at construction time.

mod config;
mod edge;
mod error;
mod node;
mod operator;
mod station;
mod time;

pub use config::GraphConfig;
pub use edge::{EdgeKey, EdgeSet, MergeOutcome, MergeStats, Minutes};
pub use error::DomainError;
pub use node::{LineToken, Node};
pub use operator::{AtocCode, InvalidAtocCode, ServiceVariant, SpeedClass};
pub use station::{
    Crs, HUB_ID_PREFIX, InvalidCrs, InvalidTiploc, NATIONAL_STATION_PREFIX, StationId, Tiploc,
};
pub use time::{MINUTES_PER_DAY, TimeNormalizer, parse_time_token, time_of_day};
