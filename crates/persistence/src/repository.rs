//! Order repository scoped to a single transaction.

use async_trait::async_trait;
use common::AggregateId;
use domain::{AggregateRoot, Order, OrderItemRecord, OrderRecord};

use crate::{
    RepositoryError,
    transaction::{Row, SqlValue, Transaction},
};

const FIND_BY_ID: &str = "SELECT id, customer_id, order_items, state FROM orders WHERE id = $1";

const UPSERT: &str = r#"
    INSERT INTO orders (id, customer_id, order_items, state)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (id) DO UPDATE SET
        customer_id = EXCLUDED.customer_id,
        order_items = EXCLUDED.order_items,
        state = EXCLUDED.state
"#;

/// Loads and stores orders.
///
/// Implementations never commit; the surrounding unit of work decides.
#[async_trait]
pub trait OrderRepository: Send {
    /// Loads the order with the given id.
    async fn find_by_id(&mut self, id: AggregateId) -> Result<Order, RepositoryError>;

    /// Inserts the order, or replaces the stored row with the same id.
    async fn upsert(&mut self, order: &Order) -> Result<(), RepositoryError>;
}

/// SQL implementation of [`OrderRepository`] over a borrowed transaction.
pub struct SqlOrderRepository<'t, T: ?Sized> {
    tx: &'t mut T,
}

impl<'t, T: Transaction + ?Sized> SqlOrderRepository<'t, T> {
    pub fn new(tx: &'t mut T) -> Self {
        Self { tx }
    }
}

fn row_to_record(row: &Row) -> Result<OrderRecord, String> {
    let text = |name: &str| {
        row.get(name)
            .and_then(SqlValue::as_text)
            .map(str::to_string)
            .ok_or_else(|| format!("column {name} is missing or not text"))
    };

    let order_items: Vec<OrderItemRecord> = match row.get("order_items") {
        Some(SqlValue::Json(value)) => serde_json::from_value(value.clone()),
        Some(SqlValue::Text(raw)) => serde_json::from_str(raw),
        _ => return Err("column order_items is missing or not JSON".to_string()),
    }
    .map_err(|e| format!("order_items: {e}"))?;

    let state = row
        .get("state")
        .and_then(SqlValue::as_int)
        .ok_or_else(|| "column state is missing or not an integer".to_string())?;

    Ok(OrderRecord {
        id: text("id")?,
        customer_id: text("customer_id")?,
        order_items,
        state,
    })
}

#[async_trait]
impl<T: Transaction + ?Sized> OrderRepository for SqlOrderRepository<'_, T> {
    async fn find_by_id(&mut self, id: AggregateId) -> Result<Order, RepositoryError> {
        tracing::debug!(order_id = %id, "loading order");

        let rows = self
            .tx
            .query(FIND_BY_ID, &[SqlValue::Text(id.to_string())])
            .await?;
        let row = rows.first().ok_or(RepositoryError::NotFound(id))?;

        let record =
            row_to_record(row).map_err(|reason| RepositoryError::CorruptData { id, reason })?;
        Order::try_from(record).map_err(|e| RepositoryError::CorruptData {
            id,
            reason: e.to_string(),
        })
    }

    async fn upsert(&mut self, order: &Order) -> Result<(), RepositoryError> {
        let record = order.to_record();
        let items = serde_json::to_value(&record.order_items).map_err(crate::StoreError::from)?;

        tracing::debug!(order_id = %order.id(), state = %order.state(), "persisting order");

        self.tx
            .execute(
                UPSERT,
                &[
                    SqlValue::Text(record.id),
                    SqlValue::Text(record.customer_id),
                    SqlValue::Json(items),
                    SqlValue::Int(record.state),
                ],
            )
            .await?;
        Ok(())
    }
}
