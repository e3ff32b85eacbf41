//! Shared types used across the order persistence workspace.

pub mod types;

pub use types::{AggregateId, IdParseError};
