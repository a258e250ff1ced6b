pub mod api;

use axum::{Router, extract::DefaultBodyLimit, routing::get};
use http::{
    HeaderName, HeaderValue, Method,
    header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        CONTENT_TYPE,
    },
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

use crate::handlers::api::health_check;
use crate::state::AppState;

const X_API_KEY: HeaderName = HeaderName::from_static("x-api-key");

/// Assemble the full application: public health check, API routes, body
/// limit and CORS handling.
///
/// Every response, including errors, carries the CORS headers so browser
/// clients can read error bodies.
pub fn create_app(app_state: Arc<AppState>) -> Router {
    let max_body_bytes = app_state.config.max_body_bytes;
    let cors_origins = app_state.config.cors_allowed_origins.clone();
    let wildcard = cors_origins.trim() == "*";

    let public_routes = Router::new().route("/", get(health_check));

    let wildcard_origin = wildcard.then(|| {
        SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        )
    });

    public_routes
        .merge(api::create_api_router())
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors_layer(&cors_origins))
        .layer(tower::util::option_layer(wildcard_origin))
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, X-Api-Key"),
        ))
}

/// Configure CORS from a comma-separated origin list or `*`.
pub fn cors_layer(origins: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, X_API_KEY])
        .allow_credentials(false);

    if origins.trim() == "*" {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| match s.parse() {
                Ok(origin) => Some(origin),
                Err(e) => {
                    warn!("Ignoring invalid CORS origin {:?}: {}", s, e);
                    None
                }
            })
            .collect();
        info!("CORS restricted to {} origin(s)", origins.len());
        layer.allow_origin(origins)
    }
}
