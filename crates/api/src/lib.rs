//! HTTP API server with observability for the order system.
//!
//! Exposes the order application service over REST, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use application::{EventPublisher, OrderApplicationService, ServiceConfig};
use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use persistence::{Database, UnitOfWork, UnitOfWorkCoordinator};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<U, P>(state: Arc<AppState<U, P>>, metrics_handle: PrometheusHandle) -> Router
where
    U: UnitOfWork + 'static,
    P: EventPublisher + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<U, P>))
        .route("/orders", post(routes::orders::create::<U, P>))
        .route("/orders/{id}", get(routes::orders::get::<U, P>))
        .route("/orders/{id}/submit", post(routes::orders::submit::<U, P>))
        .route("/orders/{id}/cancel", post(routes::orders::cancel::<U, P>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state for a store driver and a publisher.
pub fn create_state<D, P>(
    database: D,
    publisher: P,
    config: ServiceConfig,
) -> Arc<AppState<UnitOfWorkCoordinator<D>, P>>
where
    D: Database + 'static,
    P: EventPublisher + 'static,
{
    let service = OrderApplicationService::with_config(
        UnitOfWorkCoordinator::new(database),
        publisher,
        config,
    );
    Arc::new(AppState { service })
}
