use axum::{Router, routing::post};
use tower_http::trace::TraceLayer;

use crate::handlers::transcribe;
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/transcribe", post(transcribe::transcribe))
        .layer(TraceLayer::new_for_http())
}
