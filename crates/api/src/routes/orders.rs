//! Order endpoints.

use std::sync::Arc;

use application::{EventPublisher, NewOrderItem, OrderApplicationService};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{AggregateRoot, Order};
use persistence::UnitOfWork;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<U, P> {
    pub service: OrderApplicationService<U, P>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: String,
    pub items: Vec<NewOrderItem>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub customer_id: String,
    pub state: String,
    pub items: Vec<OrderItemResponse>,
    pub total_quantity: u32,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub article_no: String,
    pub quantity: u32,
}

#[derive(Serialize)]
pub struct OrderCreatedResponse {
    pub order_id: String,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            customer_id: order.customer_id().to_string(),
            state: order.state().to_string(),
            items: order
                .order_items()
                .iter()
                .map(|item| OrderItemResponse {
                    article_no: item.article_no().to_string(),
                    quantity: item.quantity().get(),
                })
                .collect(),
            total_quantity: order.total_quantity(),
        }
    }
}

// -- Handlers --

/// POST /orders: place a new pending order.
#[tracing::instrument(skip(state, req))]
pub async fn create<U: UnitOfWork, P: EventPublisher>(
    State(state): State<Arc<AppState<U, P>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderCreatedResponse>), ApiError> {
    let order_id = state
        .service
        .place_order(&req.customer_id, &req.items)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderCreatedResponse {
            order_id: order_id.to_string(),
        }),
    ))
}

/// GET /orders/{id}: load an order.
#[tracing::instrument(skip(state))]
pub async fn get<U: UnitOfWork, P: EventPublisher>(
    State(state): State<Arc<AppState<U, P>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.service.get_order(&id).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders/{id}/submit: submit a pending order.
#[tracing::instrument(skip(state))]
pub async fn submit<U: UnitOfWork, P: EventPublisher>(
    State(state): State<Arc<AppState<U, P>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.service.submit_order(&id).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders/{id}/cancel: cancel a pending order.
#[tracing::instrument(skip(state))]
pub async fn cancel<U: UnitOfWork, P: EventPublisher>(
    State(state): State<Arc<AppState<U, P>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.service.cancel_order(&id).await?;
    Ok(Json(OrderResponse::from(&order)))
}
