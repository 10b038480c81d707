//! Multimodal transit routing graph builder.
//!
//! Turns national rail timetables and metro line data into one weighted
//! graph of line, hub and ground nodes, merges it with the graph from
//! previous runs, and computes the shortest journey time between every pair
//! of stations.

pub mod catalogue;
pub mod domain;
pub mod feed;
pub mod graph;
pub mod metro;
pub mod national;
pub mod paths;
pub mod pipeline;
