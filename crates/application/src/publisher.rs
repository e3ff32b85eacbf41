//! Event publisher trait and implementations.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use domain::{DomainEvent, OrderEvent};
use thiserror::Error;

/// Errors raised while delivering an event.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PublishError {
    /// The transport refused or failed to deliver the event.
    #[error("event rejected: {0}")]
    Rejected(String),

    /// Delivery did not finish before the publish deadline.
    #[error("publish deadline of {0:?} exceeded")]
    Timeout(Duration),
}

/// Delivers order events to subscribers. Delivery is at-most-once.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &OrderEvent) -> Result<(), PublishError>;
}

#[async_trait]
impl<P: EventPublisher + ?Sized> EventPublisher for Arc<P> {
    async fn publish(&self, event: &OrderEvent) -> Result<(), PublishError> {
        (**self).publish(event).await
    }
}

#[derive(Debug, Default)]
struct InMemoryPublisherState {
    published: Vec<OrderEvent>,
    fail_on_publish: bool,
    delay: Option<Duration>,
}

/// In-memory publisher that records every delivered event.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventPublisher {
    state: Arc<RwLock<InMemoryPublisherState>>,
}

impl InMemoryEventPublisher {
    /// Creates a new in-memory publisher.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, InMemoryPublisherState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryPublisherState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configures the publisher to reject every event.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.write().fail_on_publish = fail;
    }

    /// Makes every publish wait before delivering.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.write().delay = delay;
    }

    /// Returns the delivered events in delivery order.
    pub fn published(&self) -> Vec<OrderEvent> {
        self.read().published.clone()
    }

    pub fn published_count(&self) -> usize {
        self.read().published.len()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, event: &OrderEvent) -> Result<(), PublishError> {
        let delay = self.read().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.write();
        if state.fail_on_publish {
            return Err(PublishError::Rejected("publisher unavailable".to_string()));
        }
        state.published.push(event.clone());
        Ok(())
    }
}

/// Publisher that emits each event as a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventPublisher;

impl TracingEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: &OrderEvent) -> Result<(), PublishError> {
        let payload =
            serde_json::to_string(event).map_err(|e| PublishError::Rejected(e.to_string()))?;
        tracing::info!(
            target: "order_events",
            kind = event.event_type(),
            order_id = %event.order_id(),
            %payload,
            "order event published"
        );
        Ok(())
    }
}
