use axum::{Json, response::IntoResponse};
use serde_json::json;

/// Health check endpoint for load balancers and the hosting platform.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({"status": "OK"}))
}
