//! Graph nodes.
//!
//! A station is represented at three granularities: one node per boardable
//! line, one `HUB` node joining those lines, and one `GROUND` node for the
//! street. Only ground nodes are valid journey origins and destinations.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::station::StationId;

const HUB_TOKEN: &str = "HUB";
const GROUND_TOKEN: &str = "GROUND";

/// The second half of a node key.
///
/// `HUB` and `GROUND` are reserved; anything else is a concrete line, either a
/// metro line id (`victoria`) or a national service variant (`gw-slow`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LineToken {
    Line(String),
    Hub,
    Ground,
}

impl LineToken {
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim() {
            "" => Err(DomainError::EmptyLineToken),
            HUB_TOKEN => Ok(LineToken::Hub),
            GROUND_TOKEN => Ok(LineToken::Ground),
            other => Ok(LineToken::Line(other.to_string())),
        }
    }

    /// Build a concrete line token. Reserved words map to their variants.
    pub fn line(name: impl Into<String>) -> Result<Self, DomainError> {
        LineToken::parse(&name.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            LineToken::Line(name) => name,
            LineToken::Hub => HUB_TOKEN,
            LineToken::Ground => GROUND_TOKEN,
        }
    }

    pub fn is_ground(&self) -> bool {
        matches!(self, LineToken::Ground)
    }
}

impl TryFrom<String> for LineToken {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LineToken::parse(&value)
    }
}

impl From<LineToken> for String {
    fn from(value: LineToken) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Debug for LineToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineToken({})", self.as_str())
    }
}

impl fmt::Display for LineToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the routing graph, keyed by `(station_id, line_token)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node {
    pub station: StationId,
    pub line: LineToken,
}

impl Node {
    pub fn new(station: StationId, line: LineToken) -> Self {
        Self { station, line }
    }

    pub fn hub(station: StationId) -> Self {
        Self::new(station, LineToken::Hub)
    }

    pub fn ground(station: StationId) -> Self {
        Self::new(station, LineToken::Ground)
    }

    pub fn is_ground(&self) -> bool {
        self.line.is_ground()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.station, self.line)
    }
}
