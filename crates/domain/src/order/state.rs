//! Order state machine.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The state of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──┬──► Submitted
///           │
///           └──► Cancelled
/// ```
///
/// Both targets are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderState {
    /// Order has been placed and awaits a decision.
    #[default]
    Pending,

    /// Order was submitted (terminal state).
    Submitted,

    /// Order was cancelled (terminal state).
    Cancelled,
}

impl OrderState {
    /// Decodes a persisted state code.
    pub fn from_code(code: i64) -> Result<Self, ValidationError> {
        match code {
            0 => Ok(OrderState::Cancelled),
            1 => Ok(OrderState::Pending),
            2 => Ok(OrderState::Submitted),
            _ => Err(ValidationError::InvalidStateCode { code }),
        }
    }

    /// Returns the persisted state code.
    pub fn code(&self) -> i64 {
        match self {
            OrderState::Cancelled => 0,
            OrderState::Pending => 1,
            OrderState::Submitted => 2,
        }
    }

    /// Returns true if the order can be submitted in this state.
    pub fn can_submit(&self) -> bool {
        matches!(self, OrderState::Pending)
    }

    /// Returns true if the order can be cancelled in this state.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderState::Pending)
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Submitted | OrderState::Cancelled)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Pending => "Pending",
            OrderState::Submitted => "Submitted",
            OrderState::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
