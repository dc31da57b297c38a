// handlers/public/health.rs - GET /health handler

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

/**
 * GET /health - Liveness plus a database round trip
 *
 * 200 with `{"success": true, "data": {"status": "ok", ...}}` when the
 * reference store answers, 503 with the error envelope otherwise.
 */
pub async fn health(State(state): State<AppState>) -> Response {
    let now = chrono::Utc::now();

    match state.reference.health_check().await {
        Ok(()) => ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "database": "ok",
            "version": env!("CARGO_PKG_VERSION"),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiError::service_unavailable("database unavailable").into_response()
        }
    }
}
