//! Reference and timetable feed DTOs.
//!
//! These types map directly onto the files we ingest. They use `Option`
//! liberally because the feeds omit fields, send blanks, or send nulls,
//! depending on the record.

use serde::Deserialize;

/// Top level of `CORPUSExtract.json`.
///
/// Entries are kept as raw JSON so that one malformed entry can be skipped
/// without rejecting the whole file.
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusExtract {
    #[serde(rename = "TIPLOCDATA")]
    pub tiploc_data: Vec<serde_json::Value>,
}

/// One CORPUS location.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorpusEntry {
    #[serde(rename = "TIPLOC")]
    pub tiploc: Option<String>,

    /// Long description, used as the station name.
    #[serde(rename = "NLCDESC")]
    pub nlc_desc: Option<String>,

    /// CRS code.
    #[serde(rename = "3ALPHA")]
    pub three_alpha: Option<String>,

    /// National Location Code. Sent as a number or a string.
    #[serde(rename = "NLC")]
    pub nlc: Option<CodeValue>,

    #[serde(rename = "STANOX")]
    pub stanox: Option<CodeValue>,

    #[serde(rename = "UIC")]
    pub uic: Option<CodeValue>,
}

/// A code field that may arrive as text or as a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CodeValue {
    Text(String),
    Number(i64),
}

/// One row of the NaPTAN `Stops.csv` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NaptanRow {
    #[serde(rename = "ATCOCode")]
    pub atco_code: Option<String>,

    #[serde(rename = "NaptanCode")]
    pub naptan_code: Option<String>,

    #[serde(rename = "CommonName")]
    pub common_name: Option<String>,

    #[serde(rename = "ShortCommonName")]
    pub short_common_name: Option<String>,

    /// Decimal degrees, as text. Blank when unknown.
    #[serde(rename = "Latitude")]
    pub latitude: Option<String>,

    #[serde(rename = "Longitude")]
    pub longitude: Option<String>,

    /// `RLY` for rail stations.
    #[serde(rename = "StopType")]
    pub stop_type: Option<String>,

    #[serde(rename = "LocalityName")]
    pub locality_name: Option<String>,
}

/// One line of the timetable JSONL feed.
///
/// The feed mixes several record kinds; only schedules are of interest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimetableRecord {
    #[serde(rename = "JsonScheduleV1")]
    pub schedule: Option<ScheduleDto>,
}

/// A `JsonScheduleV1` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleDto {
    /// Operating company ATOC code.
    pub atoc_code: Option<String>,

    #[serde(rename = "CIF_train_uid")]
    pub train_uid: Option<String>,

    pub schedule_segment: Option<ScheduleSegmentDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleSegmentDto {
    /// Train category, e.g. `OO` (ordinary passenger), `BR` (replacement bus).
    #[serde(rename = "CIF_train_category")]
    pub train_category: Option<String>,

    pub schedule_location: Option<Vec<ScheduleLocationDto>>,
}

/// One timing point. Times are `HHMM` with an optional `H` half-minute suffix.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleLocationDto {
    pub tiploc_code: Option<String>,
    pub arrival: Option<String>,
    pub departure: Option<String>,
    pub public_arrival: Option<String>,
    pub public_departure: Option<String>,
}
