//! Domain error types.

use common::IdParseError;
use thiserror::Error;

use crate::order::OrderState;

/// Raised by value-object and aggregate factories when input is malformed.
///
/// A factory that returns this error has constructed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An identifier is not a valid UUID.
    #[error("Invalid {field}: {source}")]
    InvalidIdentifier {
        field: &'static str,
        #[source]
        source: IdParseError,
    },

    /// Article number is empty or longer than allowed.
    #[error("Invalid article number {article_no:?}: must be 1 to {max} characters")]
    InvalidArticleNo { article_no: String, max: usize },

    /// Quantity is outside the allowed range.
    #[error("Invalid quantity {quantity}: must be between {min} and {max}")]
    InvalidQuantity { quantity: i64, min: u32, max: u32 },

    /// Persisted state code does not map to a known state.
    #[error("Invalid order state code: {code}")]
    InvalidStateCode { code: i64 },

    /// A new order was requested in a state other than Pending.
    #[error("A new order must start in Pending state, got {state}")]
    InvalidInitialState { state: OrderState },
}
