//! Order aggregate implementation.

use common::AggregateId;

use crate::aggregate::AggregateRoot;
use crate::error::ValidationError;

use super::{
    CustomerId, OrderError, OrderEvent, OrderItem, OrderItemRecord, OrderRecord, OrderState,
};

/// Order aggregate root.
///
/// Holds the current state of an order together with the events its commands
/// produced since the last drain. Equality is identity-based: two orders are
/// equal when their ids are. Identity and the event queue are exposed through
/// [`AggregateRoot`].
#[derive(Debug, Clone)]
pub struct Order {
    id: AggregateId,
    customer_id: CustomerId,
    order_items: Vec<OrderItem>,
    state: OrderState,
    pending_events: Vec<OrderEvent>,
}

// Factories
impl Order {
    /// Creates a new order with a freshly generated identity.
    ///
    /// A new order begins its lifecycle in [`OrderState::Pending`]; any other
    /// initial state is rejected.
    pub fn create(
        customer_id: CustomerId,
        order_items: Vec<OrderItem>,
        initial_state: OrderState,
    ) -> Result<Self, ValidationError> {
        if initial_state != OrderState::Pending {
            return Err(ValidationError::InvalidInitialState {
                state: initial_state,
            });
        }

        Ok(Self::reconstitute(
            AggregateId::new(),
            customer_id,
            order_items,
            initial_state,
        ))
    }

    /// Rebuilds an order in the middle of its lifecycle from validated parts.
    pub fn reconstitute(
        id: AggregateId,
        customer_id: CustomerId,
        order_items: Vec<OrderItem>,
        state: OrderState,
    ) -> Self {
        Self {
            id,
            customer_id,
            order_items,
            state,
            pending_events: Vec::new(),
        }
    }
}

// Query methods
impl Order {
    /// Returns the owning customer's identity.
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Returns a copy of the order items.
    ///
    /// Changing the returned vector does not affect the order.
    pub fn order_items(&self) -> Vec<OrderItem> {
        self.order_items.clone()
    }

    /// Returns the number of order lines.
    pub fn item_count(&self) -> usize {
        self.order_items.len()
    }

    /// Returns the summed quantity over all lines.
    pub fn total_quantity(&self) -> u32 {
        self.order_items.iter().map(|item| item.quantity().get()).sum()
    }

    /// Returns the current state.
    pub fn state(&self) -> OrderState {
        self.state
    }

    /// Returns the raw persisted shape of the order.
    pub fn to_record(&self) -> OrderRecord {
        OrderRecord {
            id: self.id.to_string(),
            customer_id: self.customer_id.to_string(),
            order_items: self.order_items.iter().map(OrderItemRecord::from).collect(),
            state: self.state.code(),
        }
    }
}

// Command methods
impl Order {
    /// Submits a pending order.
    pub fn submit(&mut self) -> Result<(), OrderError> {
        if !self.state.can_submit() {
            return Err(OrderError::InvalidStateTransition {
                current_state: self.state,
                action: "submit",
            });
        }

        self.state = OrderState::Submitted;
        self.pending_events
            .push(OrderEvent::order_submitted(self.id, self.customer_id));
        Ok(())
    }

    /// Cancels a pending order.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if !self.state.can_cancel() {
            return Err(OrderError::InvalidStateTransition {
                current_state: self.state,
                action: "cancel",
            });
        }

        self.state = OrderState::Cancelled;
        self.pending_events
            .push(OrderEvent::order_cancelled(self.id, self.customer_id));
        Ok(())
    }
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Order {}

impl AggregateRoot for Order {
    type Event = OrderEvent;

    fn aggregate_type() -> &'static str {
        "Order"
    }

    fn id(&self) -> AggregateId {
        self.id
    }

    fn pending_events(&self) -> Vec<OrderEvent> {
        self.pending_events.clone()
    }

    fn take_events(&mut self) -> Vec<OrderEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
