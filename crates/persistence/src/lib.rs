//! Persistence layer for the order system.
//!
//! - [`Transaction`] and [`Database`] are the store-driver seam. The core only
//!   ever talks to a transaction handle it was given.
//! - [`SqlOrderRepository`] and [`SqlAuditLog`] are scoped to such a handle
//!   and never commit on their own.
//! - [`UnitOfWorkCoordinator`] opens the transaction, hands the closed
//!   [`Stores`] bundle to a caller-supplied function, and commits or rolls back.
//! - [`PostgresDatabase`] is the sqlx adapter; [`ScriptedDatabase`] is an
//!   in-memory driver with scripted responses for tests.

pub mod audit;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod transaction;
pub mod unit_of_work;

pub use audit::{AuditEntry, AuditLogStore, SqlAuditLog};
pub use common::AggregateId;
pub use error::{RepositoryError, Result, StoreError};
pub use memory::{ScriptedDatabase, ScriptedTransaction, SessionLog, SessionOutcome, Statement};
pub use postgres::{PostgresDatabase, PostgresTransaction};
pub use repository::{OrderRepository, SqlOrderRepository};
pub use transaction::{Database, Row, SqlValue, Transaction};
pub use unit_of_work::{
    Stores, TransactionalStores, UnitOfWork, UnitOfWorkCoordinator, UnitOfWorkError,
};
