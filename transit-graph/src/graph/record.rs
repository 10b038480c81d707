//! Persisted station and edge records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalogue::StationMetadata;
use crate::domain::{DomainError, EdgeKey, LineToken, Minutes, Node, StationId};

/// One line of `stations.jsonl`.
///
/// Fields this crate does not know about are carried through untouched in
/// `extra`, so tags written by other tools survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub station_id: StationId,
    pub station_name: String,

    /// Three-letter reference code, or the TIPLOC when there is none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiploc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atco_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naptan_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl StationRecord {
    /// A record with only an id and a name.
    pub fn named(station_id: StationId, station_name: impl Into<String>) -> Self {
        Self {
            station_id,
            station_name: station_name.into(),
            code: None,
            latitude: None,
            longitude: None,
            tiploc: None,
            atco_code: None,
            naptan_code: None,
            locality: None,
            extra: BTreeMap::new(),
        }
    }

    /// Build a record from catalogue metadata.
    ///
    /// The name falls back to the station id, and the code to the TIPLOC.
    pub fn from_metadata(meta: &StationMetadata) -> Self {
        let station_id = meta.station_id();
        let name = meta
            .name
            .clone()
            .unwrap_or_else(|| station_id.as_str().to_string());
        let code = meta
            .three_alpha
            .map(|crs| crs.as_str().to_string())
            .unwrap_or_else(|| meta.tiploc.as_str().to_string());

        Self {
            code: Some(code),
            latitude: meta.latitude,
            longitude: meta.longitude,
            tiploc: Some(meta.tiploc.as_str().to_string()),
            atco_code: meta.atco_code.clone(),
            naptan_code: meta.naptan_code.clone(),
            locality: meta.locality_name.clone(),
            ..Self::named(station_id, name)
        }
    }

    /// Copy over every field that is set on `other` but unset here.
    ///
    /// Populated fields are never overwritten. Returns true if anything
    /// changed.
    pub fn fill_from(&mut self, other: StationRecord) -> bool {
        fn fill<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
            if slot.is_none() && value.is_some() {
                *slot = value;
                true
            } else {
                false
            }
        }

        let mut changed = false;
        if self.station_name.trim().is_empty() && !other.station_name.trim().is_empty() {
            self.station_name = other.station_name;
            changed = true;
        }
        changed |= fill(&mut self.code, other.code);
        changed |= fill(&mut self.latitude, other.latitude);
        changed |= fill(&mut self.longitude, other.longitude);
        changed |= fill(&mut self.tiploc, other.tiploc);
        changed |= fill(&mut self.atco_code, other.atco_code);
        changed |= fill(&mut self.naptan_code, other.naptan_code);
        changed |= fill(&mut self.locality, other.locality);

        for (key, value) in other.extra {
            if value.is_null() {
                continue;
            }
            let slot = self.extra.entry(key).or_insert(serde_json::Value::Null);
            if slot.is_null() {
                *slot = value;
                changed = true;
            }
        }
        changed
    }

    /// Suffix used to tell this station apart from a namesake.
    pub(crate) fn disambiguator(&self) -> &str {
        self.code
            .as_deref()
            .or(self.tiploc.as_deref())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(self.station_id.as_str())
    }
}

/// One line of `lines.jsonl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from_id: StationId,
    pub from_line: LineToken,
    pub to_id: StationId,
    pub to_line: LineToken,
    pub time: i64,
}

impl EdgeRecord {
    pub fn new(key: &EdgeKey, weight: Minutes) -> Self {
        Self {
            from_id: key.from.station.clone(),
            from_line: key.from.line.clone(),
            to_id: key.to.station.clone(),
            to_line: key.to.line.clone(),
            time: i64::from(weight.get()),
        }
    }

    /// Validate the weight and split into key and weight.
    pub fn into_entry(self) -> Result<(EdgeKey, Minutes), DomainError> {
        let weight = Minutes::new(self.time)?;
        let key = EdgeKey::new(
            Node::new(self.from_id, self.from_line),
            Node::new(self.to_id, self.to_line),
        );
        Ok((key, weight))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Crs, Tiploc};

    fn meta(tiploc: &str) -> StationMetadata {
        StationMetadata {
            tiploc: Tiploc::parse(tiploc).unwrap(),
            name: None,
            three_alpha: None,
            atco_code: None,
            naptan_code: None,
            latitude: None,
            longitude: None,
            locality_name: None,
        }
    }

    #[test]
    fn from_metadata_fallbacks() {
        let record = StationRecord::from_metadata(&meta("CLPHMJC"));
        assert_eq!(record.station_id.as_str(), "910GCLPHMJC");
        assert_eq!(record.station_name, "910GCLPHMJC");
        assert_eq!(record.code.as_deref(), Some("CLPHMJC"));
        assert_eq!(record.latitude, None);

        let mut full = meta("CLPHMJC");
        full.name = Some("Clapham Junction".to_string());
        full.three_alpha = Some(Crs::parse("CLJ").unwrap());
        full.latitude = Some(51.464);
        full.locality_name = Some("Battersea".to_string());

        let record = StationRecord::from_metadata(&full);
        assert_eq!(record.station_name, "Clapham Junction");
        assert_eq!(record.code.as_deref(), Some("CLJ"));
        assert_eq!(record.tiploc.as_deref(), Some("CLPHMJC"));
        assert_eq!(record.latitude, Some(51.464));
        assert_eq!(record.locality.as_deref(), Some("Battersea"));
    }

    #[test]
    fn fill_never_overwrites() {
        let id = StationId::parse("940GZZLUVIC").unwrap();
        let mut existing = StationRecord::named(id.clone(), "Victoria");
        existing.latitude = Some(51.0);

        let mut incoming = StationRecord::named(id, "Victoria Underground");
        incoming.latitude = Some(52.0);
        incoming.longitude = Some(-0.14);
        incoming
            .extra
            .insert("zone".to_string(), serde_json::json!(1));

        assert!(existing.fill_from(incoming.clone()));
        assert_eq!(existing.station_name, "Victoria");
        assert_eq!(existing.latitude, Some(51.0));
        assert_eq!(existing.longitude, Some(-0.14));
        assert_eq!(existing.extra["zone"], serde_json::json!(1));

        assert!(!existing.fill_from(incoming));
    }

    #[test]
    fn unknown_fields_survive() {
        let line = r#"{"station_id":"940GZZLUOXC","station_name":"Oxford Circus","zone":"1","modes":["tube"]}"#;
        let record: StationRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.code, None);
        assert_eq!(record.extra.len(), 2);

        let back: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(back["zone"], "1");
        assert_eq!(back["modes"][0], "tube");
        assert!(back.get("code").is_none());
    }

    #[test]
    fn edge_record_weight_must_be_positive() {
        let line = r#"{"from_id":"A","from_line":"GROUND","to_id":"A","to_line":"HUB","time":0}"#;
        let record: EdgeRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.into_entry(), Err(DomainError::InvalidWeight(0)));

        let line = r#"{"from_id":"A","from_line":"victoria","to_id":"B","to_line":"victoria","time":3}"#;
        let record: EdgeRecord = serde_json::from_str(line).unwrap();
        let (key, weight) = record.clone().into_entry().unwrap();
        assert_eq!(key.from.line.as_str(), "victoria");
        assert_eq!(weight.get(), 3);
        assert_eq!(EdgeRecord::new(&key, weight), record);
    }
}
