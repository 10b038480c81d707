//! Domain error types.
//!
//! These errors represent validation failures for graph identifiers and
//! weights. They are distinct from file/IO errors.

/// Domain-level errors for graph validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A station id was empty after trimming
    #[error("station id must not be empty")]
    EmptyStationId,

    /// A line token was empty after trimming
    #[error("line token must not be empty")]
    EmptyLineToken,

    /// Edge weights are whole, positive minutes
    #[error("edge weight must be a positive number of minutes, got {0}")]
    InvalidWeight(i64),
}
