//! Order application service.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use common::AggregateId;
use domain::{
    AggregateRoot, CustomerId, DomainEvent, Order, OrderError, OrderEvent, OrderItem, OrderState,
    ValidationError,
};
use persistence::{AuditEntry, RepositoryError, StoreError, Stores, UnitOfWork, UnitOfWorkError};
use serde::Deserialize;
use tokio::time::timeout;

use crate::config::ServiceConfig;
use crate::error::{Operation, ServiceError, Step};
use crate::publisher::{EventPublisher, PublishError};

/// Raw order line as supplied by a caller of [`OrderApplicationService::place_order`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewOrderItem {
    pub article_no: String,
    pub quantity: i64,
}

/// Failure inside a unit of work, before it is tied to an operation.
#[derive(Debug)]
enum StepError {
    Repository(RepositoryError, Step),
    Store(StoreError, Step),
    InvalidState(OrderError),
    Timeout(Step, Duration),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::Repository(e, step) => write!(f, "{step}: {e}"),
            StepError::Store(e, step) => write!(f, "{step}: {e}"),
            StepError::InvalidState(e) => write!(f, "{e}"),
            StepError::Timeout(step, budget) => write!(f, "{step} timed out after {budget:?}"),
        }
    }
}

impl StepError {
    fn into_service_error(self, operation: Operation, order_id: AggregateId) -> ServiceError {
        match self {
            StepError::Repository(RepositoryError::NotFound(_), _) => ServiceError::NotFound {
                operation,
                order_id,
            },
            StepError::Repository(RepositoryError::CorruptData { reason, .. }, _) => {
                ServiceError::CorruptData {
                    operation,
                    order_id,
                    reason,
                }
            }
            StepError::Repository(RepositoryError::Persistence(source), step)
            | StepError::Store(source, step) => ServiceError::Persistence {
                operation,
                order_id,
                step,
                source,
            },
            StepError::InvalidState(source) => ServiceError::InvalidState {
                operation,
                order_id,
                source,
            },
            StepError::Timeout(step, budget) => ServiceError::Timeout {
                operation,
                order_id,
                step,
                budget,
            },
        }
    }
}

fn unit_of_work_error(
    err: UnitOfWorkError<StepError>,
    operation: Operation,
    order_id: AggregateId,
) -> ServiceError {
    match err {
        UnitOfWorkError::Begin(source) => ServiceError::Persistence {
            operation,
            order_id,
            step: Step::Begin,
            source,
        },
        UnitOfWorkError::Commit(source) => ServiceError::Persistence {
            operation,
            order_id,
            step: Step::Commit,
            source,
        },
        UnitOfWorkError::Work(e) => e.into_service_error(operation, order_id),
    }
}

/// A state-changing command on a loaded order.
#[derive(Clone, Copy)]
struct Command {
    action: &'static str,
    apply: fn(&mut Order) -> Result<(), OrderError>,
}

const SUBMIT: Command = Command {
    action: "submit",
    apply: Order::submit,
};

const CANCEL: Command = Command {
    action: "cancel",
    apply: Order::cancel,
};

async fn bounded<T, F>(step: Step, budget: Duration, future: F) -> Result<T, StepError>
where
    F: Future<Output = Result<T, StepError>>,
{
    timeout(budget, future)
        .await
        .map_err(|_| StepError::Timeout(step, budget))?
}

async fn fetch(
    stores: &mut dyn Stores,
    id: AggregateId,
    budget: Duration,
) -> Result<Order, StepError> {
    bounded(Step::Fetch, budget, async {
        stores
            .orders()
            .find_by_id(id)
            .await
            .map_err(|e| StepError::Repository(e, Step::Fetch))
    })
    .await
}

async fn persist(
    stores: &mut dyn Stores,
    order: &Order,
    entry: &AuditEntry,
    budget: Duration,
) -> Result<(), StepError> {
    bounded(Step::Persist, budget, async {
        stores
            .orders()
            .upsert(order)
            .await
            .map_err(|e| StepError::Repository(e, Step::Persist))?;
        stores
            .audit_log()
            .record(entry)
            .await
            .map_err(|e| StepError::Store(e, Step::Persist))
    })
    .await
}

/// Loads the order, applies the command, and persists the result. Returns
/// the order and its drained events.
async fn apply_command(
    stores: &mut dyn Stores,
    id: AggregateId,
    command: Command,
    config: ServiceConfig,
) -> Result<(Order, Vec<OrderEvent>), StepError> {
    let mut order = fetch(stores, id, config.fetch_timeout).await?;

    let from_state = order.state();
    (command.apply)(&mut order).map_err(StepError::InvalidState)?;
    let entry = AuditEntry::transition(id, command.action, from_state, order.state());

    persist(stores, &order, &entry, config.persist_timeout).await?;

    let events = order.take_events();
    Ok((order, events))
}

/// Application service for orders.
///
/// Each call runs in its own unit of work. Events are published only after
/// the unit of work has committed, in the order the aggregate raised them,
/// against one deadline shared by the whole batch.
pub struct OrderApplicationService<U, P> {
    unit_of_work: U,
    publisher: P,
    config: ServiceConfig,
}

impl<U: UnitOfWork, P: EventPublisher> OrderApplicationService<U, P> {
    /// Creates a service with the default time budgets.
    pub fn new(unit_of_work: U, publisher: P) -> Self {
        Self::with_config(unit_of_work, publisher, ServiceConfig::default())
    }

    pub fn with_config(unit_of_work: U, publisher: P, config: ServiceConfig) -> Self {
        Self {
            unit_of_work,
            publisher,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn unit_of_work(&self) -> &U {
        &self.unit_of_work
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Submits a pending order.
    #[tracing::instrument(skip(self))]
    pub async fn submit_order(&self, order_id: &str) -> Result<Order, ServiceError> {
        let started = Instant::now();
        let result = self.execute(Operation::SubmitOrder, order_id, SUBMIT).await;
        record_outcome(Operation::SubmitOrder, started, &result);
        result
    }

    /// Cancels a pending order.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: &str) -> Result<Order, ServiceError> {
        let started = Instant::now();
        let result = self.execute(Operation::CancelOrder, order_id, CANCEL).await;
        record_outcome(Operation::CancelOrder, started, &result);
        result
    }

    /// Validates raw input, creates a pending order, and stores it.
    #[tracing::instrument(skip(self, items), fields(item_count = items.len()))]
    pub async fn place_order(
        &self,
        customer_id: &str,
        items: &[NewOrderItem],
    ) -> Result<AggregateId, ServiceError> {
        let started = Instant::now();
        let result = self.place(customer_id, items).await;
        record_outcome(Operation::PlaceOrder, started, &result);
        result
    }

    /// Loads an order.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: &str) -> Result<Order, ServiceError> {
        let started = Instant::now();
        let result = self.load(order_id).await;
        record_outcome(Operation::GetOrder, started, &result);
        result
    }

    async fn execute(
        &self,
        operation: Operation,
        raw_id: &str,
        command: Command,
    ) -> Result<Order, ServiceError> {
        let id = parse_order_id(operation, raw_id)?;
        let config = self.config;

        let (order, events) = self
            .unit_of_work
            .atomically(move |stores| Box::pin(apply_command(stores, id, command, config)))
            .await
            .map_err(|e| unit_of_work_error(e, operation, id))?;

        tracing::info!(order_id = %id, state = %order.state(), "order {}", command.action);

        self.publish_all(operation, id, events).await?;
        Ok(order)
    }

    async fn place(
        &self,
        raw_customer_id: &str,
        items: &[NewOrderItem],
    ) -> Result<AggregateId, ServiceError> {
        let operation = Operation::PlaceOrder;
        let validation = |input: &str, source| ServiceError::Validation {
            operation,
            input: input.to_string(),
            source,
        };

        let customer_id =
            CustomerId::parse(raw_customer_id).map_err(|e| validation(raw_customer_id, e))?;
        let order_items = items
            .iter()
            .map(|item| {
                OrderItem::new(&item.article_no, item.quantity).map_err(|e| match e {
                    ValidationError::InvalidQuantity { .. } => {
                        validation(&item.quantity.to_string(), e)
                    }
                    _ => validation(&item.article_no, e),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let order = Order::create(customer_id, order_items, OrderState::Pending)
            .map_err(|e| validation(raw_customer_id, e))?;

        let id = order.id();
        let entry = AuditEntry::transition(id, "create", OrderState::Pending, OrderState::Pending);
        let budget = self.config.persist_timeout;

        self.unit_of_work
            .atomically(move |stores| {
                Box::pin(async move { persist(stores, &order, &entry, budget).await })
            })
            .await
            .map_err(|e| unit_of_work_error(e, operation, id))?;

        tracing::info!(order_id = %id, %customer_id, "order placed");
        Ok(id)
    }

    async fn load(&self, raw_id: &str) -> Result<Order, ServiceError> {
        let operation = Operation::GetOrder;
        let id = parse_order_id(operation, raw_id)?;
        let budget = self.config.fetch_timeout;

        self.unit_of_work
            .atomically(move |stores| Box::pin(fetch(stores, id, budget)))
            .await
            .map_err(|e| unit_of_work_error(e, operation, id))
    }

    /// Publishes events in order until the first failure.
    async fn publish_all(
        &self,
        operation: Operation,
        order_id: AggregateId,
        events: Vec<OrderEvent>,
    ) -> Result<(), ServiceError> {
        let budget = self.config.publish_timeout;
        let deadline = tokio::time::Instant::now() + budget;

        for event in events {
            let kind = event.event_type();
            let outcome = tokio::time::timeout_at(deadline, self.publisher.publish(&event))
                .await
                .unwrap_or(Err(PublishError::Timeout(budget)));

            if let Err(source) = outcome {
                tracing::warn!(
                    %order_id,
                    kind,
                    error = %source,
                    "event publication failed after commit"
                );
                return Err(ServiceError::Publish {
                    operation,
                    order_id,
                    event_kind: kind,
                    source,
                });
            }
            metrics::counter!("order_events_published_total", "kind" => kind).increment(1);
        }
        Ok(())
    }
}

fn parse_order_id(operation: Operation, raw_id: &str) -> Result<AggregateId, ServiceError> {
    AggregateId::parse(raw_id).map_err(|source| ServiceError::Validation {
        operation,
        input: raw_id.to_string(),
        source: ValidationError::InvalidIdentifier {
            field: "order id",
            source,
        },
    })
}

fn record_outcome<T>(operation: Operation, started: Instant, result: &Result<T, ServiceError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };
    metrics::counter!(
        "order_commands_total",
        "operation" => operation.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("order_command_duration_seconds", "operation" => operation.as_str())
        .record(started.elapsed().as_secs_f64());
}
