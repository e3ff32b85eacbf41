//! Order aggregate and related types.

mod aggregate;
mod events;
mod record;
mod state;
mod value_objects;

pub use aggregate::Order;
pub use events::{OrderCancelledData, OrderEvent, OrderSubmittedData};
pub use record::{OrderItemRecord, OrderRecord};
pub use state::OrderState;
pub use value_objects::{ArticleNo, CustomerId, OrderItem, Quantity};

use thiserror::Error;

/// Errors raised by order commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Order is not in the expected state.
    #[error("Invalid state transition: cannot {action} from {current_state} state")]
    InvalidStateTransition {
        current_state: OrderState,
        action: &'static str,
    },
}
