//! Train operator (ATOC) code and service variant types.

use std::fmt;

/// Error returned when parsing an invalid ATOC code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ATOC code: {reason}")]
pub struct InvalidAtocCode {
    reason: &'static str,
}

/// A valid 2-letter ATOC (Association of Train Operating Companies) operator code.
///
/// ATOC codes identify train operating companies (e.g., "GW" for Great Western Railway,
/// "VT" for Avanti West Coast). The timetable feed sends them uppercase; the graph
/// uses the lowercase form as the prefix of a national-rail line token.
///
/// # Examples
///
/// ```
/// use transit_graph::domain::AtocCode;
///
/// let gw = AtocCode::parse("GW").unwrap();
/// assert_eq!(gw.as_str(), "GW");
/// assert_eq!(gw.line_prefix(), "gw");
///
/// // Surrounding whitespace and case do not matter
/// assert_eq!(AtocCode::parse(" gw ").unwrap(), gw);
///
/// // Wrong length is rejected
/// assert!(AtocCode::parse("G").is_err());
/// assert!(AtocCode::parse("GWR").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtocCode([u8; 2]);

impl AtocCode {
    /// Parse an ATOC code from a string.
    ///
    /// After trimming, the input must be exactly 2 ASCII letters.
    pub fn parse(s: &str) -> Result<Self, InvalidAtocCode> {
        let bytes = s.trim().as_bytes();

        if bytes.len() != 2 {
            return Err(InvalidAtocCode {
                reason: "must be exactly 2 characters",
            });
        }

        for &b in bytes {
            if !b.is_ascii_alphabetic() {
                return Err(InvalidAtocCode {
                    reason: "must be ASCII letters A-Z",
                });
            }
        }

        Ok(AtocCode([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
        ]))
    }

    /// Returns the ATOC code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII uppercase letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Lowercase form used in line tokens (`gw-slow`).
    pub fn line_prefix(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }
}

impl fmt::Debug for AtocCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AtocCode({})", self.as_str())
    }
}

impl fmt::Display for AtocCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a service calls at most of its timing points or skips many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpeedClass {
    Slow,
    Express,
}

impl SpeedClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedClass::Slow => "slow",
            SpeedClass::Express => "express",
        }
    }
}

impl fmt::Display for SpeedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operator's slow or express family of services.
///
/// Every national rail schedule is folded into one of these, and the variant
/// is what the graph treats as a "line".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceVariant {
    pub operator: AtocCode,
    pub speed: SpeedClass,
}

impl ServiceVariant {
    pub fn new(operator: AtocCode, speed: SpeedClass) -> Self {
        Self { operator, speed }
    }

    /// The line token string, e.g. `gw-express`.
    pub fn line_name(&self) -> String {
        format!("{}-{}", self.operator.line_prefix(), self.speed)
    }
}
