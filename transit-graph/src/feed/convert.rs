//! Conversion from feed DTOs to domain types.
//!
//! Everything that enters the core passes through here: blanks become
//! `None`, codes are validated, and records that cannot be used are
//! reported as [`ConversionError`] so the caller can skip them.

use crate::catalogue::{CorpusRecord, StopPoint, extract_tiploc_from_atco};
use crate::domain::{AtocCode, Crs, Tiploc};
use crate::national::{Schedule, TimingPoint};

use super::error::ConversionError;
use super::types::{CodeValue, CorpusEntry, NaptanRow, ScheduleDto, ScheduleLocationDto};

/// Trim a string, treating blank as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn code_text(value: Option<CodeValue>) -> Option<String> {
    match value? {
        CodeValue::Text(s) => non_blank(Some(s)),
        CodeValue::Number(n) => Some(n.to_string()),
    }
}

fn parse_coordinate(value: Option<String>) -> Option<f64> {
    non_blank(value)?.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Convert a CORPUS entry. Entries without a valid TIPLOC are rejected; an
/// unusable CRS code is dropped rather than failing the record.
pub fn corpus_record(entry: CorpusEntry) -> Result<CorpusRecord, ConversionError> {
    let raw = non_blank(entry.tiploc).ok_or(ConversionError::MissingField("TIPLOC"))?;
    let tiploc = Tiploc::parse(&raw).map_err(|_| ConversionError::InvalidTiploc(raw))?;

    Ok(CorpusRecord {
        tiploc,
        name: non_blank(entry.nlc_desc),
        three_alpha: non_blank(entry.three_alpha).and_then(|c| Crs::parse(&c).ok()),
        nalco: code_text(entry.nlc),
        stanox: code_text(entry.stanox),
        uic: code_text(entry.uic),
    })
}

/// Convert a NaPTAN row, returning the TIPLOC it belongs to.
pub fn stop_point(row: NaptanRow) -> Result<(Tiploc, StopPoint), ConversionError> {
    let atco_code = non_blank(row.atco_code)
        .ok_or(ConversionError::MissingField("ATCOCode"))?
        .to_ascii_uppercase();
    let tiploc = extract_tiploc_from_atco(&atco_code)
        .ok_or_else(|| ConversionError::InvalidTiploc(atco_code.clone()))?;

    let name = non_blank(row.common_name)
        .or_else(|| non_blank(row.short_common_name))
        .unwrap_or_else(|| atco_code.clone());

    let point = StopPoint {
        naptan_code: non_blank(row.naptan_code),
        name,
        latitude: parse_coordinate(row.latitude),
        longitude: parse_coordinate(row.longitude),
        stop_type: non_blank(row.stop_type),
        locality_name: non_blank(row.locality_name),
        atco_code,
    };
    Ok((tiploc, point))
}

fn timing_point(dto: ScheduleLocationDto) -> TimingPoint {
    TimingPoint {
        tiploc: non_blank(dto.tiploc_code).and_then(|t| Tiploc::parse(&t).ok()),
        arrival: non_blank(dto.arrival),
        departure: non_blank(dto.departure),
        public_arrival: non_blank(dto.public_arrival),
        public_departure: non_blank(dto.public_departure),
    }
}

/// Convert a schedule. An operator code and a train category are required.
pub fn schedule(dto: ScheduleDto) -> Result<Schedule, ConversionError> {
    let raw_operator = non_blank(dto.atoc_code).ok_or(ConversionError::MissingField("atoc_code"))?;
    let operator = AtocCode::parse(&raw_operator)
        .map_err(|_| ConversionError::InvalidOperator(raw_operator))?;

    let segment = dto
        .schedule_segment
        .ok_or(ConversionError::MissingField("schedule_segment"))?;
    let category = non_blank(segment.train_category)
        .ok_or(ConversionError::MissingField("CIF_train_category"))?
        .to_ascii_uppercase();

    let locations = segment
        .schedule_location
        .unwrap_or_default()
        .into_iter()
        .map(timing_point)
        .collect();

    Ok(Schedule {
        operator,
        category,
        locations,
    })
}
