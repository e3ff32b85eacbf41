//! Domain layer for the order persistence system.
//!
//! This crate provides:
//! - `AggregateRoot` and `DomainEvent` traits
//! - Validated value objects (`CustomerId`, `ArticleNo`, `Quantity`, `OrderItem`)
//! - The `Order` aggregate with its Pending → Submitted | Cancelled state machine
//! - `OrderRecord`, the raw persisted shape an order is reconstituted from

pub mod aggregate;
pub mod error;
pub mod order;

pub use aggregate::{AggregateRoot, DomainEvent};
pub use common::AggregateId;
pub use error::ValidationError;
pub use order::{
    ArticleNo, CustomerId, Order, OrderCancelledData, OrderError, OrderEvent, OrderItem,
    OrderItemRecord, OrderRecord, OrderState, OrderSubmittedData, Quantity,
};
