//! JSONL persistence for the graph between runs.
//!
//! A missing file loads as empty, since the first run has nothing to merge
//! with. A line that is not JSON at all is fatal. A line that is JSON but not
//! a usable record (blank id, non-positive weight) is logged and skipped.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::domain::{EdgeSet, StationId};

use super::accumulator::GraphAccumulator;
use super::record::{EdgeRecord, StationRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt record at {}:{line}: {message}", path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Read every non-blank line of a JSONL file. `Ok(None)` if the file does
/// not exist.
///
/// Lines that decode as JSON but not as `T` are skipped.
fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<(usize, T)>>, StoreError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "No existing file, starting empty");
            return Ok(None);
        }
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let mut records = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| StoreError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value =
            serde_json::from_str(&line).map_err(|e| StoreError::Corrupt {
                path: path.to_path_buf(),
                line: index + 1,
                message: e.to_string(),
            })?;
        match serde_json::from_value(value) {
            Ok(record) => records.push((index + 1, record)),
            Err(e) => {
                warn!(path = %path.display(), line = index + 1, error = %e, "Skipping invalid record");
            }
        }
    }
    Ok(Some(records))
}

/// Line-at-a-time JSONL output.
pub(crate) struct JsonlWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    count: usize,
}

impl JsonlWriter {
    /// Create or truncate `path`, creating parent directories if needed.
    pub(crate) fn create(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            count: 0,
        })
    }

    pub(crate) fn write<T: Serialize + ?Sized>(&mut self, record: &T) -> Result<(), StoreError> {
        serde_json::to_writer(&mut self.writer, record)
            .map_err(|e| StoreError::io(&self.path, e.into()))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| StoreError::io(&self.path, e))?;
        self.count += 1;
        Ok(())
    }

    /// Flush and return the number of records written.
    pub(crate) fn finish(mut self) -> Result<usize, StoreError> {
        self.writer
            .flush()
            .map_err(|e| StoreError::io(&self.path, e))?;
        debug!(path = %self.path.display(), records = self.count, "Wrote file");
        Ok(self.count)
    }
}

fn write_jsonl<'a, T, I>(path: &Path, records: I) -> Result<usize, StoreError>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut writer = JsonlWriter::create(path)?;
    for record in records {
        writer.write(record)?;
    }
    writer.finish()
}

/// Load `stations.jsonl`. Later duplicates fill unset fields of earlier ones.
pub fn load_stations(path: &Path) -> Result<BTreeMap<StationId, StationRecord>, StoreError> {
    let mut stations: BTreeMap<StationId, StationRecord> = BTreeMap::new();
    for (_, record) in read_jsonl::<StationRecord>(path)?.unwrap_or_default() {
        match stations.get_mut(&record.station_id) {
            Some(existing) => {
                existing.fill_from(record);
            }
            None => {
                stations.insert(record.station_id.clone(), record);
            }
        }
    }
    Ok(stations)
}

/// Load `lines.jsonl`. Duplicate keys keep the minimum weight.
pub fn load_edges(path: &Path) -> Result<EdgeSet, StoreError> {
    let mut edges = EdgeSet::new();
    for (line, record) in read_jsonl::<EdgeRecord>(path)?.unwrap_or_default() {
        match record.into_entry() {
            Ok((key, weight)) => {
                edges.offer(key, weight);
            }
            Err(e) => {
                warn!(path = %path.display(), line, error = %e, "Skipping invalid edge");
            }
        }
    }
    Ok(edges)
}

/// Write stations sorted by id.
pub fn save_stations(
    path: &Path,
    stations: &BTreeMap<StationId, StationRecord>,
) -> Result<usize, StoreError> {
    write_jsonl(path, stations.values())
}

/// Write edges sorted by key.
pub fn save_edges(path: &Path, edges: &EdgeSet) -> Result<usize, StoreError> {
    let mut writer = JsonlWriter::create(path)?;
    for (key, weight) in edges.iter() {
        writer.write(&EdgeRecord::new(key, weight))?;
    }
    writer.finish()
}

/// Load a persisted graph into an accumulator.
pub fn load_graph(stations: &Path, lines: &Path) -> Result<GraphAccumulator, StoreError> {
    let station_records = load_stations(stations)?;
    let edges = load_edges(lines)?;
    info!(
        stations = station_records.len(),
        edges = edges.len(),
        "Loaded persisted graph"
    );
    Ok(GraphAccumulator::from_parts(station_records, edges))
}

/// Persist an accumulator.
pub fn save_graph(graph: &GraphAccumulator, stations: &Path, lines: &Path) -> Result<(), StoreError> {
    let station_count = save_stations(stations, graph.stations())?;
    let edge_count = save_edges(lines, graph.edges())?;
    info!(stations = station_count, edges = edge_count, "Saved graph");
    Ok(())
}
