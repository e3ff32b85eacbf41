//! Unit of work: one transaction spanning every store a piece of work touches.

use std::fmt;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use crate::{
    StoreError,
    audit::{AuditLogStore, SqlAuditLog},
    repository::{OrderRepository, SqlOrderRepository},
    transaction::{Database, Transaction},
};

/// The stores available inside a unit of work, all bound to its transaction.
pub trait Stores: Send {
    fn orders(&mut self) -> Box<dyn OrderRepository + '_>;

    fn audit_log(&mut self) -> Box<dyn AuditLogStore + '_>;
}

/// [`Stores`] built over a single transaction handle.
pub struct TransactionalStores<'t, T: ?Sized> {
    tx: &'t mut T,
}

impl<'t, T: Transaction + ?Sized> TransactionalStores<'t, T> {
    pub fn new(tx: &'t mut T) -> Self {
        Self { tx }
    }
}

impl<T: Transaction + ?Sized> Stores for TransactionalStores<'_, T> {
    fn orders(&mut self) -> Box<dyn OrderRepository + '_> {
        Box::new(SqlOrderRepository::new(&mut *self.tx))
    }

    fn audit_log(&mut self) -> Box<dyn AuditLogStore + '_> {
        Box::new(SqlAuditLog::new(&mut *self.tx))
    }
}

/// Failure of a unit of work.
#[derive(Debug)]
pub enum UnitOfWorkError<E> {
    /// The transaction could not be opened; the work never ran.
    Begin(StoreError),

    /// The work failed and the transaction was rolled back.
    Work(E),

    /// The work succeeded but the commit failed.
    Commit(StoreError),
}

impl<E: fmt::Display> fmt::Display for UnitOfWorkError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitOfWorkError::Begin(e) => write!(f, "could not begin transaction: {e}"),
            UnitOfWorkError::Work(e) => write!(f, "{e}"),
            UnitOfWorkError::Commit(e) => write!(f, "could not commit transaction: {e}"),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for UnitOfWorkError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UnitOfWorkError::Begin(e) | UnitOfWorkError::Commit(e) => Some(e),
            UnitOfWorkError::Work(e) => Some(e),
        }
    }
}

/// Runs work atomically against a bundle of transactional stores.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Opens a transaction, runs `work` with stores bound to it, and commits
    /// when `work` succeeds. On failure the transaction is rolled back and
    /// the work's error is returned unchanged; a panic inside `work` is
    /// propagated after the rollback.
    async fn atomically<R, E, F>(&self, work: F) -> Result<R, UnitOfWorkError<E>>
    where
        F: for<'s> FnOnce(&'s mut dyn Stores) -> BoxFuture<'s, Result<R, E>> + Send,
        R: Send,
        E: fmt::Display + Send;
}

/// [`UnitOfWork`] backed by a [`Database`].
#[derive(Clone)]
pub struct UnitOfWorkCoordinator<D> {
    database: D,
}

impl<D: Database> UnitOfWorkCoordinator<D> {
    pub fn new(database: D) -> Self {
        Self { database }
    }

    pub fn database(&self) -> &D {
        &self.database
    }
}

async fn rollback<T: Transaction>(tx: &mut T) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(error = %e, "rollback failed");
    }
}

#[async_trait]
impl<D: Database> UnitOfWork for UnitOfWorkCoordinator<D> {
    #[tracing::instrument(skip_all)]
    async fn atomically<R, E, F>(&self, work: F) -> Result<R, UnitOfWorkError<E>>
    where
        F: for<'s> FnOnce(&'s mut dyn Stores) -> BoxFuture<'s, Result<R, E>> + Send,
        R: Send,
        E: fmt::Display + Send,
    {
        let mut tx = self.database.begin().await.map_err(|e| {
            tracing::error!(error = %e, "failed to begin transaction");
            metrics::counter!("unit_of_work_total", "outcome" => "begin_failed").increment(1);
            UnitOfWorkError::Begin(e)
        })?;

        let outcome = {
            let mut stores = TransactionalStores::new(&mut tx);
            let stores: &mut dyn Stores = &mut stores;
            AssertUnwindSafe(work(stores)).catch_unwind().await
        };

        match outcome {
            Ok(Ok(value)) => match tx.commit().await {
                Ok(()) => {
                    tracing::debug!("unit of work committed");
                    metrics::counter!("unit_of_work_total", "outcome" => "committed").increment(1);
                    Ok(value)
                }
                Err(e) => {
                    tracing::error!(error = %e, "commit failed");
                    rollback(&mut tx).await;
                    metrics::counter!("unit_of_work_total", "outcome" => "commit_failed")
                        .increment(1);
                    Err(UnitOfWorkError::Commit(e))
                }
            },
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "unit of work failed, rolling back");
                rollback(&mut tx).await;
                metrics::counter!("unit_of_work_total", "outcome" => "rolled_back").increment(1);
                Err(UnitOfWorkError::Work(e))
            }
            Err(panic) => {
                tracing::error!("unit of work panicked, rolling back");
                rollback(&mut tx).await;
                metrics::counter!("unit_of_work_total", "outcome" => "panicked").increment(1);
                std::panic::resume_unwind(panic)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RepositoryError;
    use crate::audit::AuditEntry;
    use crate::memory::{ScriptedDatabase, SessionOutcome};
    use common::AggregateId;
    use domain::{AggregateRoot, CustomerId, Order, OrderItem, OrderState};

    fn new_order() -> Order {
        Order::create(
            CustomerId::new(),
            vec![OrderItem::new("SKU-001", 1).unwrap()],
            OrderState::Pending,
        )
        .unwrap()
    }

    fn coordinator() -> (ScriptedDatabase, UnitOfWorkCoordinator<ScriptedDatabase>) {
        let db = ScriptedDatabase::new();
        (db.clone(), UnitOfWorkCoordinator::new(db))
    }

    #[tokio::test]
    async fn test_success_commits_both_stores() {
        let (db, uow) = coordinator();
        let order = new_order();
        let id = order.id();

        let result: Result<AggregateId, UnitOfWorkError<RepositoryError>> = uow
            .atomically(move |stores| {
                Box::pin(async move {
                    stores.orders().upsert(&order).await?;
                    stores
                        .audit_log()
                        .record(&AuditEntry::transition(
                            id,
                            "create",
                            OrderState::Pending,
                            OrderState::Pending,
                        ))
                        .await?;
                    Ok(id)
                })
            })
            .await;

        assert_eq!(result.unwrap(), id);
        assert_eq!(db.commit_count(), 1);
        assert_eq!(db.committed_statements().len(), 2);
    }

    #[tokio::test]
    async fn test_second_store_failure_rolls_back_first() {
        let (db, uow) = coordinator();
        db.fail_execute("order_audit_log", "audit table locked");
        let order = new_order();

        let result: Result<(), UnitOfWorkError<RepositoryError>> = uow
            .atomically(move |stores| {
                Box::pin(async move {
                    stores.orders().upsert(&order).await?;
                    stores
                        .audit_log()
                        .record(&AuditEntry::transition(
                            order.id(),
                            "create",
                            OrderState::Pending,
                            OrderState::Pending,
                        ))
                        .await?;
                    Ok(())
                })
            })
            .await;

        assert!(matches!(
            result,
            Err(UnitOfWorkError::Work(RepositoryError::Persistence(_)))
        ));
        let sessions = db.sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].statements.len(), 2);
        assert_eq!(sessions[0].outcome, SessionOutcome::RolledBack);
        assert!(db.committed_statements().is_empty());
    }

    #[tokio::test]
    async fn test_work_error_is_returned_unchanged() {
        let (db, uow) = coordinator();
        let id = AggregateId::new();

        let result: Result<(), UnitOfWorkError<RepositoryError>> = uow
            .atomically(move |stores| {
                Box::pin(async move {
                    stores.orders().find_by_id(id).await?;
                    Ok(())
                })
            })
            .await;

        assert!(matches!(
            result,
            Err(UnitOfWorkError::Work(RepositoryError::NotFound(missing))) if missing == id
        ));
        assert_eq!(db.rollback_count(), 1);
        assert_eq!(db.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_rollback_failure_keeps_original_error() {
        let (db, uow) = coordinator();
        db.fail_rollback("connection lost");

        let result: Result<(), UnitOfWorkError<String>> = uow
            .atomically(|_stores| Box::pin(async { Err("work failed".to_string()) }))
            .await;

        assert!(matches!(result, Err(UnitOfWorkError::Work(message)) if message == "work failed"));
        assert_eq!(db.sessions()[0].rollback_calls, 1);
        assert_eq!(db.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_begin_failure_skips_work() {
        let (db, uow) = coordinator();
        db.fail_begin("pool exhausted");
        let mut ran = false;

        let result: Result<(), UnitOfWorkError<String>> = uow
            .atomically(|_stores| {
                ran = true;
                Box::pin(async { Ok(()) })
            })
            .await;

        assert!(matches!(result, Err(UnitOfWorkError::Begin(_))));
        assert!(!ran);
    }

    #[tokio::test]
    async fn test_commit_failure_is_reported() {
        let (db, uow) = coordinator();
        db.fail_commit("serialization failure");

        let result: Result<u8, UnitOfWorkError<String>> = uow
            .atomically(|_stores| Box::pin(async { Ok(7) }))
            .await;

        assert!(matches!(result, Err(UnitOfWorkError::Commit(_))));
        assert!(db.committed_statements().is_empty());
    }

    #[tokio::test]
    async fn test_panic_rolls_back_and_propagates() {
        let (db, uow) = coordinator();
        let order = new_order();
        let explode = true;

        let handle = tokio::spawn(async move {
            let _: Result<(), UnitOfWorkError<String>> = uow
                .atomically(move |stores| {
                    Box::pin(async move {
                        stores
                            .orders()
                            .upsert(&order)
                            .await
                            .map_err(|e| e.to_string())?;
                        if explode {
                            panic!("boom");
                        }
                        Ok(())
                    })
                })
                .await;
        });

        let join = handle.await;
        assert!(join.unwrap_err().is_panic());
        assert_eq!(db.sessions()[0].outcome, SessionOutcome::RolledBack);
        assert_eq!(db.sessions()[0].rollback_calls, 1);
        assert!(db.committed_statements().is_empty());
    }

    #[test]
    fn test_error_display() {
        let err: UnitOfWorkError<String> = UnitOfWorkError::Commit(StoreError::TransactionFinished);
        assert_eq!(
            err.to_string(),
            "could not commit transaction: Transaction already finished"
        );
        let err: UnitOfWorkError<String> = UnitOfWorkError::Work("boom".to_string());
        assert_eq!(err.to_string(), "boom");
    }
}
