//! Choosing one NaPTAN stop point per TIPLOC.

use std::collections::BTreeMap;

use crate::domain::Tiploc;

use super::StopPoint;

/// Best-effort TIPLOC extraction from an ATCO code.
///
/// Rail ATCO codes look like `9100{TIPLOC}`, `910{TIPLOC}` or
/// `{digits}{TIPLOC}{digits}`; the TIPLOC is the first run of three or more
/// letters.
///
/// ```
/// use transit_graph::catalogue::extract_tiploc_from_atco;
///
/// assert_eq!(extract_tiploc_from_atco("9100KNGX").unwrap().as_str(), "KNGX");
/// assert_eq!(extract_tiploc_from_atco("9100crewe1").unwrap().as_str(), "CREWE");
/// assert!(extract_tiploc_from_atco("91001234").is_none());
/// ```
pub fn extract_tiploc_from_atco(atco_code: &str) -> Option<Tiploc> {
    let upper = atco_code.trim().to_ascii_uppercase();
    let bytes = upper.as_bytes();

    let mut start = None;
    for (i, b) in bytes.iter().enumerate() {
        match (b.is_ascii_uppercase(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) if i - s >= 3 => return Tiploc::parse(&upper[s..i]).ok(),
            (false, Some(_)) => start = None,
            _ => {}
        }
    }

    match start {
        Some(s) if bytes.len() - s >= 3 => Tiploc::parse(&upper[s..]).ok(),
        _ => None,
    }
}

/// Keeps the most useful stop point seen for each TIPLOC.
///
/// Several NaPTAN entries can map to one TIPLOC. A candidate replaces the
/// kept entry when it supplies coordinates the kept one lacks, or when it is
/// a rail station (`RLY`) replacing a non-rail entry without losing
/// coordinates. Otherwise the first entry wins.
#[derive(Debug, Clone, Default)]
pub struct StopPointIndex {
    by_tiploc: BTreeMap<Tiploc, StopPoint>,
}

impl StopPointIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a candidate. Returns true if it is now the kept entry.
    pub fn offer(&mut self, tiploc: Tiploc, candidate: StopPoint) -> bool {
        let Some(existing) = self.by_tiploc.get(&tiploc) else {
            self.by_tiploc.insert(tiploc, candidate);
            return true;
        };

        let upgrade_coordinates = !existing.has_coordinates() && candidate.has_coordinates();
        let upgrade_rail = candidate.is_rail_station()
            && !existing.is_rail_station()
            && (candidate.has_coordinates() || !existing.has_coordinates());

        if upgrade_coordinates || upgrade_rail {
            self.by_tiploc.insert(tiploc, candidate);
            return true;
        }
        false
    }

    pub fn len(&self) -> usize {
        self.by_tiploc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tiploc.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<Tiploc, StopPoint> {
        self.by_tiploc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(atco: &str, stop_type: &str, coords: Option<(f64, f64)>) -> StopPoint {
        StopPoint {
            atco_code: atco.to_string(),
            naptan_code: None,
            name: atco.to_string(),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            stop_type: Some(stop_type.to_string()),
            locality_name: None,
        }
    }

    fn tiploc(s: &str) -> Tiploc {
        Tiploc::parse(s).unwrap()
    }

    #[test]
    fn extract_handles_trailing_digits_and_short_runs() {
        assert_eq!(extract_tiploc_from_atco("9100AB12CDE3").unwrap().as_str(), "CDE");
        assert_eq!(extract_tiploc_from_atco("9100AB").map(|t| t.as_str().to_string()), None);
        assert!(extract_tiploc_from_atco("").is_none());
    }

    #[test]
    fn extract_rejects_runs_too_long_for_tiploc() {
        assert!(extract_tiploc_from_atco("9100ABCDEFGHIJ").is_none());
    }

    #[test]
    fn first_entry_kept_by_default() {
        let mut idx = StopPointIndex::new();
        assert!(idx.offer(tiploc("AAA"), point("first", "BCT", Some((1.0, 1.0)))));
        assert!(!idx.offer(tiploc("AAA"), point("second", "BCT", Some((2.0, 2.0)))));
        assert_eq!(idx.into_map()[&tiploc("AAA")].atco_code, "first");
    }

    #[test]
    fn coordinates_upgrade() {
        let mut idx = StopPointIndex::new();
        idx.offer(tiploc("AAA"), point("bare", "RLY", None));
        assert!(idx.offer(tiploc("AAA"), point("located", "BCT", Some((1.0, 1.0)))));
        assert_eq!(idx.into_map()[&tiploc("AAA")].atco_code, "located");
    }

    #[test]
    fn rail_upgrade_keeps_coordinates() {
        let mut idx = StopPointIndex::new();
        idx.offer(tiploc("AAA"), point("bus", "BCT", Some((1.0, 1.0))));
        // A rail entry without coordinates must not replace a located one.
        assert!(!idx.offer(tiploc("AAA"), point("rail-bare", "RLY", None)));
        assert!(idx.offer(tiploc("AAA"), point("rail", "RLY", Some((2.0, 2.0)))));
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.into_map()[&tiploc("AAA")].atco_code, "rail");
    }
}
