//! The end-to-end graph build: ingest, merge, persist, and solve.

use std::path::PathBuf;

use tracing::info;

use crate::catalogue::StationCatalogue;
use crate::domain::GraphConfig;
use crate::feed::{FeedError, iter_schedules, load_corpus, load_stop_points};
use crate::graph::{PassOutput, StoreError, load_graph, merge_passes, save_graph};
use crate::metro::{MetroConfig, SnapshotProvider, build_metro_pass};
use crate::national::{BoundingBox, build_national_graph};
use crate::paths::{CompactGraph, TableError, write_journey_times};

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Table(#[from] TableError),

    /// An environment variable has an unusable value
    #[error("invalid {var}: {message}")]
    Config { var: &'static str, message: String },

    /// The national pass task panicked or was cancelled
    #[error("national pass failed: {0}")]
    Task(String),
}

/// Input and output locations plus build parameters.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub corpus_path: PathBuf,
    pub stops_path: PathBuf,
    pub timetable_path: PathBuf,
    pub stations_path: PathBuf,
    pub lines_path: PathBuf,
    pub shortest_paths_path: PathBuf,

    /// Metro snapshot. The metro pass is skipped when unset.
    pub metro_snapshot_path: Option<PathBuf>,

    pub graph: GraphConfig,
    pub metro: MetroConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("national_data/CORPUSExtract.json"),
            stops_path: PathBuf::from("national_data/Stops.csv"),
            timetable_path: PathBuf::from("national_data/toc-full.jsonl"),
            stations_path: PathBuf::from("stations.jsonl"),
            lines_path: PathBuf::from("lines.jsonl"),
            shortest_paths_path: PathBuf::from("shortest_paths.jsonl"),
            metro_snapshot_path: None,
            graph: GraphConfig::default(),
            metro: MetroConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read overrides through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        let paths = [
            ("CORPUS_PATH", &mut config.corpus_path),
            ("STOPS_PATH", &mut config.stops_path),
            ("TIMETABLE_PATH", &mut config.timetable_path),
            ("STATIONS_PATH", &mut config.stations_path),
            ("LINES_PATH", &mut config.lines_path),
            ("SHORTEST_PATHS_PATH", &mut config.shortest_paths_path),
        ];
        for (var, slot) in paths {
            if let Some(value) = get(var) {
                *slot = PathBuf::from(value);
            }
        }

        config.metro_snapshot_path = get("METRO_SNAPSHOT_PATH").map(PathBuf::from);

        if let Some(raw) = get("NATIONAL_SCHEDULE_LIMIT") {
            let limit = raw.trim().parse::<usize>().map_err(|e| PipelineError::Config {
                var: "NATIONAL_SCHEDULE_LIMIT",
                message: e.to_string(),
            })?;
            config.graph = config.graph.with_schedule_limit(Some(limit));
        }

        Ok(config)
    }
}

/// Totals from one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub stations: usize,
    pub edges: usize,
    pub updates: usize,
    pub inserts: usize,
    pub journeys: usize,
}

/// Run the whole build.
///
/// The national pass is CPU bound and runs on the blocking pool while the
/// metro pass waits on its collaborator.
pub async fn run(config: &PipelineConfig) -> Result<PipelineSummary, PipelineError> {
    info!(
        ground_to_hub_mins = config.graph.ground_to_hub().num_minutes(),
        platform_to_hub_mins = config.graph.platform_to_hub().num_minutes(),
        max_wait_secs = config.graph.max_wait().num_seconds(),
        metro_connector_mins = config.metro.connector().num_minutes(),
        metro_batch_size = config.metro.batch_size,
        schedule_limit = ?config.graph.schedule_limit,
        "Starting graph build"
    );

    let corpus = load_corpus(&config.corpus_path)?;
    let stops = load_stop_points(&config.stops_path)?;
    let catalogue = StationCatalogue::build(&corpus, &stops);
    info!(stations = catalogue.len(), "Built station catalogue");

    let mut schedules = iter_schedules(&config.timetable_path)?;
    let graph_config = config.graph.clone();
    let national = tokio::task::spawn_blocking(move || {
        let graph = build_national_graph(
            &catalogue,
            schedules.by_ref(),
            &graph_config,
            &BoundingBox::LONDON,
        );
        schedules.finish()?;
        Ok::<_, FeedError>(graph.into_pass())
    });

    let metro = async {
        let Some(path) = &config.metro_snapshot_path else {
            info!("No metro snapshot configured, skipping metro pass");
            return Ok::<_, PipelineError>(None);
        };
        let provider = SnapshotProvider::load(path)?;
        Ok(Some(
            build_metro_pass(provider.network(), &provider, &config.metro).await,
        ))
    };

    let (national, metro) = tokio::join!(national, metro);
    let national = national.map_err(|e| PipelineError::Task(e.to_string()))??;

    let mut passes: Vec<PassOutput> = vec![national];
    passes.extend(metro?);

    let mut graph = load_graph(&config.stations_path, &config.lines_path)?;
    let merged = merge_passes(&mut graph, passes);
    let hubs_removed = graph.filter_synthetic_hubs();
    let renamed = graph.disambiguate_names();
    info!(hubs_removed, renamed, "Finished station catalogue");

    save_graph(&graph, &config.stations_path, &config.lines_path)?;

    let compact = CompactGraph::from_edges(graph.edges());
    let journeys = write_journey_times(&config.shortest_paths_path, &compact)?;

    let summary = PipelineSummary {
        stations: graph.stations().len(),
        edges: graph.edges().len(),
        updates: merged.edges.updates,
        inserts: merged.edges.inserts,
        journeys,
    };
    info!(
        stations = summary.stations,
        edges = summary.edges,
        updates = summary.updates,
        inserts = summary.inserts,
        journeys = summary.journeys,
        "Pipeline complete"
    );
    Ok(summary)
}
