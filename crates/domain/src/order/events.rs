//! Order domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::CustomerId;

/// Events that can occur on an order aggregate.
///
/// Serialized as `{"kind": "submit" | "cancel", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload")]
pub enum OrderEvent {
    /// Order was submitted.
    #[serde(rename = "submit")]
    Submitted(OrderSubmittedData),

    /// Order was cancelled.
    #[serde(rename = "cancel")]
    Cancelled(OrderCancelledData),
}

impl OrderEvent {
    /// Kind of [`OrderEvent::Submitted`].
    pub const SUBMIT: &'static str = "submit";

    /// Kind of [`OrderEvent::Cancelled`].
    pub const CANCEL: &'static str = "cancel";

    /// Creates a Submitted event.
    pub fn order_submitted(order_id: AggregateId, customer_id: CustomerId) -> Self {
        OrderEvent::Submitted(OrderSubmittedData {
            order_id,
            customer_id,
            submitted_at: Utc::now(),
        })
    }

    /// Creates a Cancelled event.
    pub fn order_cancelled(order_id: AggregateId, customer_id: CustomerId) -> Self {
        OrderEvent::Cancelled(OrderCancelledData {
            order_id,
            customer_id,
            cancelled_at: Utc::now(),
        })
    }

    /// Returns the id of the order the event belongs to.
    pub fn order_id(&self) -> AggregateId {
        match self {
            OrderEvent::Submitted(data) => data.order_id,
            OrderEvent::Cancelled(data) => data.order_id,
        }
    }
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Submitted(_) => Self::SUBMIT,
            OrderEvent::Cancelled(_) => Self::CANCEL,
        }
    }
}

/// Data for the Submitted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSubmittedData {
    /// The submitted order.
    pub order_id: AggregateId,

    /// The customer who owns the order.
    pub customer_id: CustomerId,

    /// When the order was submitted.
    pub submitted_at: DateTime<Utc>,
}

/// Data for the Cancelled event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCancelledData {
    /// The cancelled order.
    pub order_id: AggregateId,

    /// The customer who owns the order.
    pub customer_id: CustomerId,

    /// When the order was cancelled.
    pub cancelled_at: DateTime<Utc>,
}
