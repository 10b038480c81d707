//! Station code types.
//!
//! Three identifiers travel through the graph build: the CRS code from the
//! reference table, the TIPLOC that keys every timetable location, and the
//! free-form `StationId` that names a node in the persisted graph.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Prefix prepended to a TIPLOC to form a national rail station id.
pub const NATIONAL_STATION_PREFIX: &str = "910G";

/// Prefix that marks a synthetic interchange (hub) station id.
pub const HUB_ID_PREFIX: &str = "HUB";

/// Error returned when parsing an invalid CRS code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid CRS code: {reason}")]
pub struct InvalidCrs {
    reason: &'static str,
}

/// A valid 3-letter CRS (Computer Reservation System) station code.
///
/// CORPUS publishes these as `3ALPHA`. They end up as the station `code` in
/// the persisted catalogue and as part of London area hub ids (`HUBKGX`).
///
/// # Examples
///
/// ```
/// use transit_graph::domain::Crs;
///
/// let kgx = Crs::parse("KGX").unwrap();
/// assert_eq!(kgx.as_str(), "KGX");
///
/// // Lowercase is normalised
/// assert_eq!(Crs::parse("kgx").unwrap(), kgx);
///
/// // Wrong length is rejected
/// assert!(Crs::parse("KG").is_err());
/// assert!(Crs::parse("KGXX").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Crs([u8; 3]);

impl Crs {
    /// Parse a CRS code from a string.
    ///
    /// Surrounding whitespace is ignored and letters are uppercased; what
    /// remains must be exactly 3 ASCII letters.
    pub fn parse(s: &str) -> Result<Self, InvalidCrs> {
        let bytes = s.trim().as_bytes();

        if bytes.len() != 3 {
            return Err(InvalidCrs {
                reason: "must be exactly 3 characters",
            });
        }

        let mut out = [0u8; 3];
        for (slot, &b) in out.iter_mut().zip(bytes) {
            if !b.is_ascii_alphabetic() {
                return Err(InvalidCrs {
                    reason: "must be ASCII letters A-Z",
                });
            }
            *slot = b.to_ascii_uppercase();
        }

        Ok(Crs(out))
    }

    /// Returns the CRS code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII uppercase letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Debug for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Crs({})", self.as_str())
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an invalid TIPLOC.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid TIPLOC: {reason}")]
pub struct InvalidTiploc {
    reason: &'static str,
}

/// A timing point location code, 1 to 7 ASCII alphanumerics, stored uppercase.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tiploc(String);

impl Tiploc {
    const MAX_LEN: usize = 7;

    /// Parse a TIPLOC, trimming whitespace and uppercasing.
    pub fn parse(s: &str) -> Result<Self, InvalidTiploc> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidTiploc { reason: "empty" });
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(InvalidTiploc {
                reason: "longer than 7 characters",
            });
        }
        if !trimmed.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(InvalidTiploc {
                reason: "must be ASCII letters or digits",
            });
        }
        Ok(Tiploc(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The graph station id for this location (`910G` + TIPLOC).
    pub fn station_id(&self) -> StationId {
        StationId(format!("{NATIONAL_STATION_PREFIX}{}", self.0))
    }
}

impl fmt::Debug for Tiploc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tiploc({})", self.0)
    }
}

impl fmt::Display for Tiploc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a station in the graph.
///
/// Ids come from several sources (metro NaPTAN ids, `910G` national ids,
/// `HUB` area hubs) so the only constraint enforced is that the id is not
/// blank. Ordering is plain string ordering, which is what name
/// disambiguation and every sorted output rely on.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationId(String);

impl StationId {
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyStationId);
        }
        Ok(StationId(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id names a synthetic interchange rather than a boardable
    /// station. Such ids never survive into the persisted station catalogue.
    pub fn is_synthetic_hub(&self) -> bool {
        self.0.starts_with(HUB_ID_PREFIX)
    }
}

impl TryFrom<String> for StationId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        StationId::parse(&value)
    }
}

impl From<StationId> for String {
    fn from(value: StationId) -> Self {
        value.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any three letters parse, and parsing is case-insensitive
        #[test]
        fn crs_case_insensitive(s in "[A-Za-z]{3}") {
            let crs = Crs::parse(&s).unwrap();
            prop_assert_eq!(crs.as_str(), s.to_ascii_uppercase());
        }

        /// Wrong-length strings are always rejected
        #[test]
        fn crs_wrong_length_rejected(s in "[A-Z]{0,2}|[A-Z]{4,10}") {
            prop_assert!(Crs::parse(&s).is_err());
        }

        /// TIPLOC-derived station ids are never hubs
        #[test]
        fn tiploc_ids_not_hubs(s in "[A-Z0-9]{1,7}") {
            let id = Tiploc::parse(&s).unwrap().station_id();
            prop_assert!(!id.is_synthetic_hub());
        }
    }
}
