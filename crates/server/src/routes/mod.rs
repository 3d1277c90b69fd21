//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health            - Liveness check
//! GET  /health/ready      - Readiness check (credential store reachable)
//!
//! # Auth
//! POST /api/auth/login    - Exchange email + password for a token
//! ```

pub mod auth;
pub mod health;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the auth routes router, mounted at `/api/auth`.
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(auth::login))
}

/// Build the complete application router.
pub fn app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/auth", auth_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy for browser clients.
///
/// With no configured origin any origin is allowed.
///
/// # Errors
///
/// Returns an error if `origin` is not a valid header value.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, header::InvalidHeaderValue> {
    let allow_origin = match origin {
        Some(origin) => AllowOrigin::exact(origin.parse::<HeaderValue>()?),
        None => AllowOrigin::from(Any),
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}
