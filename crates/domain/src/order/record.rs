//! Raw persisted shape of an order.

use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

use super::{CustomerId, Order, OrderItem, OrderState};

/// Unvalidated order data as it is stored.
///
/// Converting a record into an [`Order`] runs every field through the same
/// factories used for direct construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    pub customer_id: String,
    pub order_items: Vec<OrderItemRecord>,
    pub state: i64,
}

/// Unvalidated order line, stored as `{"articleNo": ..., "quantity": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRecord {
    pub article_no: String,
    pub quantity: i64,
}

impl From<&OrderItem> for OrderItemRecord {
    fn from(item: &OrderItem) -> Self {
        Self {
            article_no: item.article_no().as_str().to_string(),
            quantity: i64::from(item.quantity().get()),
        }
    }
}

impl TryFrom<&OrderItemRecord> for OrderItem {
    type Error = ValidationError;

    fn try_from(record: &OrderItemRecord) -> Result<Self, Self::Error> {
        OrderItem::new(&record.article_no, record.quantity)
    }
}

impl TryFrom<OrderRecord> for Order {
    type Error = ValidationError;

    fn try_from(record: OrderRecord) -> Result<Self, Self::Error> {
        let id = AggregateId::parse(&record.id).map_err(|source| {
            ValidationError::InvalidIdentifier {
                field: "order id",
                source,
            }
        })?;
        let customer_id = CustomerId::parse(&record.customer_id)?;
        let order_items = record
            .order_items
            .iter()
            .map(OrderItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let state = OrderState::from_code(record.state)?;

        Ok(Order::reconstitute(id, customer_id, order_items, state))
    }
}
