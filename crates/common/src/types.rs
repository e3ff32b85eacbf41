use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error returned when text cannot be parsed into an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid identifier {value:?}: {reason}")]
pub struct IdParseError {
    /// The rejected input.
    pub value: String,
    /// Why the input was rejected.
    pub reason: String,
}

/// Unique identifier for an aggregate instance.
///
/// Wraps a UUID so an identity can only be obtained by generating a fresh
/// one or by parsing text through [`AggregateId::parse`]. Raw strings are
/// never accepted as identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(Uuid);

impl AggregateId {
    /// Creates a new random aggregate ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an aggregate ID from its textual UUID form.
    pub fn parse(value: &str) -> Result<Self, IdParseError> {
        Uuid::parse_str(value).map(Self).map_err(|e| IdParseError {
            value: value.to_string(),
            reason: e.to_string(),
        })
    }

    /// Creates an aggregate ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AggregateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AggregateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AggregateId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for AggregateId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<AggregateId> for Uuid {
    fn from(id: AggregateId) -> Self {
        id.0
    }
}
