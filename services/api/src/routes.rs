use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use reimbursement::error::AppError;
use reimbursement::estimation::{ReimbursementEstimate, TripInput};
use reimbursement::TripRecord;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub(crate) struct BatchRequest {
    pub(crate) trips: Vec<TripInput>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchResponse {
    pub(crate) amounts: Vec<f64>,
}

pub(crate) fn reimbursement_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/reimbursements/estimate", post(estimate_endpoint))
        .route("/api/v1/reimbursements/batch", post(batch_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn estimate_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<TripInput>,
) -> Result<Json<ReimbursementEstimate>, AppError> {
    let trip = TripRecord::try_from(payload)?;
    Ok(Json(state.engine.estimate(&trip)))
}

/// Rejects the whole batch if any trip is invalid.
pub(crate) async fn batch_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, AppError> {
    let amounts = payload
        .trips
        .into_iter()
        .map(|input| {
            TripRecord::try_from(input).map(|trip| state.engine.reimburse(&trip))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(BatchResponse { amounts }))
}
