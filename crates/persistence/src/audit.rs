//! Audit log of order state transitions.

use async_trait::async_trait;
use common::AggregateId;
use domain::OrderState;

use crate::{
    Result,
    transaction::{SqlValue, Transaction},
};

const INSERT_ENTRY: &str =
    "INSERT INTO order_audit_log (order_id, action, from_state, to_state) VALUES ($1, $2, $3, $4)";

/// A recorded state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub order_id: AggregateId,
    pub action: String,
    pub from_state: OrderState,
    pub to_state: OrderState,
}

impl AuditEntry {
    pub fn transition(
        order_id: AggregateId,
        action: impl Into<String>,
        from_state: OrderState,
        to_state: OrderState,
    ) -> Self {
        Self {
            order_id,
            action: action.into(),
            from_state,
            to_state,
        }
    }
}

/// Append-only store of [`AuditEntry`] values.
#[async_trait]
pub trait AuditLogStore: Send {
    async fn record(&mut self, entry: &AuditEntry) -> Result<()>;
}

/// SQL implementation of [`AuditLogStore`] over a borrowed transaction.
pub struct SqlAuditLog<'t, T: ?Sized> {
    tx: &'t mut T,
}

impl<'t, T: Transaction + ?Sized> SqlAuditLog<'t, T> {
    pub fn new(tx: &'t mut T) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl<T: Transaction + ?Sized> AuditLogStore for SqlAuditLog<'_, T> {
    async fn record(&mut self, entry: &AuditEntry) -> Result<()> {
        self.tx
            .execute(
                INSERT_ENTRY,
                &[
                    SqlValue::Text(entry.order_id.to_string()),
                    SqlValue::Text(entry.action.clone()),
                    SqlValue::Int(entry.from_state.code()),
                    SqlValue::Int(entry.to_state.code()),
                ],
            )
            .await?;
        Ok(())
    }
}
