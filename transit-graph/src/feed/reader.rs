//! File readers for the reference and timetable feeds.
//!
//! A file that cannot be opened, or whose overall shape is wrong, is a
//! [`FeedError`]. Individual records that fail to decode or convert are
//! skipped with a debug log.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::catalogue::{CorpusRecord, StopPoint, StopPointIndex};
use crate::domain::Tiploc;
use crate::national::Schedule;

use super::convert;
use super::error::FeedError;
use super::types::{CorpusEntry, CorpusExtract, NaptanRow, TimetableRecord};

fn open(path: &Path) -> Result<File, FeedError> {
    File::open(path).map_err(|source| FeedError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the CORPUS extract, keyed by TIPLOC.
///
/// When a TIPLOC appears more than once the first entry is kept.
pub fn load_corpus(path: &Path) -> Result<BTreeMap<Tiploc, CorpusRecord>, FeedError> {
    let reader = BufReader::new(open(path)?);
    let value: serde_json::Value =
        serde_json::from_reader(reader).map_err(|e| FeedError::Json {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if value.get("TIPLOCDATA").is_none_or(|v| !v.is_array()) {
        return Err(FeedError::Structure {
            path: path.to_path_buf(),
            reason: "missing TIPLOCDATA array",
        });
    }
    let extract: CorpusExtract = serde_json::from_value(value).map_err(|e| FeedError::Json {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut records = BTreeMap::new();
    let mut skipped = 0usize;
    for raw in extract.tiploc_data {
        let record = serde_json::from_value::<CorpusEntry>(raw)
            .map_err(|e| e.to_string())
            .and_then(|entry| convert::corpus_record(entry).map_err(|e| e.to_string()));

        match record {
            Ok(record) => {
                records.entry(record.tiploc.clone()).or_insert(record);
            }
            Err(e) => {
                skipped += 1;
                debug!(error = %e, "Skipping CORPUS entry");
            }
        }
    }

    info!(path = %path.display(), records = records.len(), skipped, "Loaded CORPUS");
    Ok(records)
}

/// Load NaPTAN stop points, choosing one per TIPLOC.
pub fn load_stop_points(path: &Path) -> Result<BTreeMap<Tiploc, StopPoint>, FeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(open(path)?);

    reader.headers().map_err(|e| FeedError::Csv {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut index = StopPointIndex::new();
    let mut rows = 0usize;
    let mut skipped = 0usize;
    for result in reader.deserialize::<NaptanRow>() {
        rows += 1;
        let converted = result
            .map_err(|e| e.to_string())
            .and_then(|row| convert::stop_point(row).map_err(|e| e.to_string()));

        match converted {
            Ok((tiploc, point)) => {
                index.offer(tiploc, point);
            }
            Err(e) => {
                skipped += 1;
                debug!(error = %e, "Skipping NaPTAN row");
            }
        }
    }

    info!(path = %path.display(), rows, skipped, tiplocs = index.len(), "Loaded stop points");
    Ok(index.into_map())
}

/// Decode one timetable line. Returns `None` for anything that is not a
/// usable schedule.
pub fn parse_schedule_line(line: &str) -> Option<Schedule> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let record: TimetableRecord = match serde_json::from_str(line) {
        Ok(record) => record,
        Err(e) => {
            debug!(error = %e, "Skipping malformed timetable line");
            return None;
        }
    };

    let dto = record.schedule?;
    let train_uid = dto.train_uid.clone();
    match convert::schedule(dto) {
        Ok(schedule) => Some(schedule),
        Err(e) => {
            debug!(train_uid = train_uid.as_deref().unwrap_or("-"), error = %e, "Skipping schedule");
            None
        }
    }
}

/// Streaming iterator over the schedules in a JSONL timetable.
///
/// Lines are read lazily so the whole feed is never held in memory. Lines
/// that are not UTF-8 are skipped like any other malformed record. A read
/// error ends the stream and is reported by [`ScheduleReader::finish`].
pub struct ScheduleReader {
    path: PathBuf,
    reader: BufReader<File>,
    buf: Vec<u8>,
    lines_read: usize,
    schedules: usize,
    error: Option<std::io::Error>,
}

impl ScheduleReader {
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    pub fn schedules(&self) -> usize {
        self.schedules
    }

    /// Surface any read error that ended the stream.
    pub fn finish(self) -> Result<(), FeedError> {
        match self.error {
            Some(source) => Err(FeedError::Io {
                path: self.path,
                source,
            }),
            None => Ok(()),
        }
    }
}

impl Iterator for ScheduleReader {
    type Item = Schedule;

    fn next(&mut self) -> Option<Schedule> {
        if self.error.is_some() {
            return None;
        }
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    warn!(path = %self.path.display(), line = self.lines_read + 1, error = %e, "Timetable read failed");
                    self.error = Some(e);
                    return None;
                }
            }
            self.lines_read += 1;

            let line = match std::str::from_utf8(&self.buf) {
                Ok(line) => line,
                Err(e) => {
                    debug!(line = self.lines_read, error = %e, "Skipping non-UTF-8 timetable line");
                    continue;
                }
            };

            if let Some(schedule) = parse_schedule_line(line) {
                self.schedules += 1;
                return Some(schedule);
            }
        }
    }
}

/// Open a JSONL timetable for streaming.
pub fn iter_schedules(path: &Path) -> Result<ScheduleReader, FeedError> {
    let file = open(path)?;
    Ok(ScheduleReader {
        path: path.to_path_buf(),
        reader: BufReader::new(file),
        buf: Vec::new(),
        lines_read: 0,
        schedules: 0,
        error: None,
    })
}
