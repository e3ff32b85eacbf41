//! Order application service.
//!
//! [`OrderApplicationService`] runs each command inside one unit of work:
//! load the order, apply the command, persist the order with its audit
//! entry, commit, then publish the drained events to an [`EventPublisher`].

pub mod config;
pub mod error;
pub mod publisher;
pub mod service;

pub use config::ServiceConfig;
pub use error::{Operation, ServiceError, Step};
pub use publisher::{EventPublisher, InMemoryEventPublisher, PublishError, TracingEventPublisher};
pub use service::{NewOrderItem, OrderApplicationService};
