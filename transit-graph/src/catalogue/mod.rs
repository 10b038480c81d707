//! Station catalogue.
//!
//! Merges the CORPUS reference table (names, CRS codes) with NaPTAN stop
//! points (coordinates, locality) into one metadata record per TIPLOC. The
//! timetable pass only keeps stops whose TIPLOC is in the catalogue.

mod stop_points;

pub use stop_points::{StopPointIndex, extract_tiploc_from_atco};

use std::collections::BTreeMap;

use crate::domain::{Crs, StationId, Tiploc};

/// Reference data for a TIPLOC as provided by CORPUS.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusRecord {
    pub tiploc: Tiploc,
    pub name: Option<String>,
    pub three_alpha: Option<Crs>,
    pub nalco: Option<String>,
    pub stanox: Option<String>,
    pub uic: Option<String>,
}

/// NaPTAN stop point associated with a TIPLOC.
#[derive(Debug, Clone, PartialEq)]
pub struct StopPoint {
    pub atco_code: String,
    pub naptan_code: Option<String>,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub stop_type: Option<String>,
    pub locality_name: Option<String>,
}

impl StopPoint {
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    pub fn is_rail_station(&self) -> bool {
        self.stop_type.as_deref() == Some("RLY")
    }
}

/// Merged metadata for one location.
///
/// Fields neither source knows about stay `None`; nothing is defaulted, so
/// "unknown" is never confused with zero or empty.
#[derive(Debug, Clone, PartialEq)]
pub struct StationMetadata {
    pub tiploc: Tiploc,
    pub name: Option<String>,
    pub three_alpha: Option<Crs>,
    pub atco_code: Option<String>,
    pub naptan_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub locality_name: Option<String>,
}

impl StationMetadata {
    /// The graph station id of this location.
    pub fn station_id(&self) -> StationId {
        self.tiploc.station_id()
    }

    /// Latitude and longitude, if both are known.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    /// Merge the two sources for one TIPLOC.
    ///
    /// The name comes from CORPUS when it has one, otherwise from NaPTAN.
    /// Coordinates, locality and NaPTAN codes only ever come from NaPTAN.
    pub fn merge(tiploc: Tiploc, corpus: Option<&CorpusRecord>, stop: Option<&StopPoint>) -> Self {
        let name = corpus
            .and_then(|c| c.name.clone())
            .or_else(|| stop.map(|s| s.name.clone()));

        Self {
            tiploc,
            name,
            three_alpha: corpus.and_then(|c| c.three_alpha),
            atco_code: stop.map(|s| s.atco_code.clone()),
            naptan_code: stop.and_then(|s| s.naptan_code.clone()),
            latitude: stop.and_then(|s| s.latitude),
            longitude: stop.and_then(|s| s.longitude),
            locality_name: stop.and_then(|s| s.locality_name.clone()),
        }
    }
}

/// TIPLOC-indexed station metadata.
#[derive(Debug, Clone, Default)]
pub struct StationCatalogue {
    by_tiploc: BTreeMap<Tiploc, StationMetadata>,
}

impl StationCatalogue {
    /// Build one record per TIPLOC known to either source.
    pub fn build(
        corpus: &BTreeMap<Tiploc, CorpusRecord>,
        stops: &BTreeMap<Tiploc, StopPoint>,
    ) -> Self {
        let mut by_tiploc = BTreeMap::new();

        for tiploc in corpus.keys().chain(stops.keys()) {
            if by_tiploc.contains_key(tiploc) {
                continue;
            }
            let meta = StationMetadata::merge(tiploc.clone(), corpus.get(tiploc), stops.get(tiploc));
            by_tiploc.insert(tiploc.clone(), meta);
        }

        Self { by_tiploc }
    }

    pub fn get(&self, tiploc: &Tiploc) -> Option<&StationMetadata> {
        self.by_tiploc.get(tiploc)
    }

    pub fn contains(&self, tiploc: &Tiploc) -> bool {
        self.by_tiploc.contains_key(tiploc)
    }

    pub fn len(&self) -> usize {
        self.by_tiploc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tiploc.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StationMetadata> {
        self.by_tiploc.values()
    }
}

impl FromIterator<StationMetadata> for StationCatalogue {
    fn from_iter<I: IntoIterator<Item = StationMetadata>>(iter: I) -> Self {
        Self {
            by_tiploc: iter.into_iter().map(|m| (m.tiploc.clone(), m)).collect(),
        }
    }
}
