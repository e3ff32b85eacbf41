//! Service error types.

use std::fmt;
use std::time::Duration;

use common::AggregateId;
use domain::{OrderError, ValidationError};
use persistence::StoreError;
use thiserror::Error;

use crate::publisher::PublishError;

/// The service operation a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    PlaceOrder,
    GetOrder,
    SubmitOrder,
    CancelOrder,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::PlaceOrder => "place_order",
            Operation::GetOrder => "get_order",
            Operation::SubmitOrder => "submit_order",
            Operation::CancelOrder => "cancel_order",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The step of a unit of work that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Begin,
    Fetch,
    Persist,
    Commit,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Begin => "begin",
            Step::Fetch => "fetch",
            Step::Persist => "persist",
            Step::Commit => "commit",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`OrderApplicationService`](crate::OrderApplicationService).
///
/// Every variant names the operation and the order it was working on. For
/// [`ServiceError::Validation`] that is the raw input as supplied, since no
/// valid id exists yet.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed validation before any I/O.
    #[error("{operation}: invalid input {input:?}: {source}")]
    Validation {
        operation: Operation,
        input: String,
        #[source]
        source: ValidationError,
    },

    /// No stored order has the id.
    #[error("{operation} {order_id}: order not found")]
    NotFound {
        operation: Operation,
        order_id: AggregateId,
    },

    /// The stored order failed validation on load.
    #[error("{operation} {order_id}: stored order is corrupt: {reason}")]
    CorruptData {
        operation: Operation,
        order_id: AggregateId,
        reason: String,
    },

    /// The command is not allowed in the order's current state.
    #[error("{operation} {order_id}: {source}")]
    InvalidState {
        operation: Operation,
        order_id: AggregateId,
        #[source]
        source: OrderError,
    },

    /// The store driver failed.
    #[error("{operation} {order_id}: persistence failed during {step}: {source}")]
    Persistence {
        operation: Operation,
        order_id: AggregateId,
        step: Step,
        #[source]
        source: StoreError,
    },

    /// A bounded step ran past its budget.
    #[error("{operation} {order_id}: {step} timed out after {budget:?}")]
    Timeout {
        operation: Operation,
        order_id: AggregateId,
        step: Step,
        budget: Duration,
    },

    /// The state change was committed but an event could not be published.
    #[error("{operation} {order_id}: committed, but publishing {event_kind} event failed: {source}")]
    Publish {
        operation: Operation,
        order_id: AggregateId,
        event_kind: &'static str,
        #[source]
        source: PublishError,
    },
}

impl ServiceError {
    /// Short machine-readable name of the variant, used as a metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation { .. } => "validation",
            ServiceError::NotFound { .. } => "not_found",
            ServiceError::CorruptData { .. } => "corrupt_data",
            ServiceError::InvalidState { .. } => "invalid_state",
            ServiceError::Persistence { .. } => "persistence",
            ServiceError::Timeout { .. } => "timeout",
            ServiceError::Publish { .. } => "publish",
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            ServiceError::Validation { operation, .. }
            | ServiceError::NotFound { operation, .. }
            | ServiceError::CorruptData { operation, .. }
            | ServiceError::InvalidState { operation, .. }
            | ServiceError::Persistence { operation, .. }
            | ServiceError::Timeout { operation, .. }
            | ServiceError::Publish { operation, .. } => *operation,
        }
    }

    /// Whether the state change was durably committed despite the error.
    pub fn is_committed(&self) -> bool {
        matches!(self, ServiceError::Publish { .. })
    }
}
