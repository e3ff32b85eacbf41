//! Health check endpoint.

use std::convert::Infallible;
use std::sync::Arc;

use application::EventPublisher;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use persistence::{UnitOfWork, UnitOfWorkError};
use serde::Serialize;

use super::orders::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health: opens and commits an empty unit of work to probe the store.
pub async fn check<U: UnitOfWork, P: EventPublisher>(
    State(state): State<Arc<AppState<U, P>>>,
) -> (StatusCode, Json<HealthResponse>) {
    let probe: Result<(), UnitOfWorkError<Infallible>> = state
        .service
        .unit_of_work()
        .atomically(|_stores| Box::pin(async { Ok(()) }))
        .await;

    match probe {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "ok" })),
        Err(e) => {
            tracing::warn!(error = %e, "health probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                }),
            )
        }
    }
}
