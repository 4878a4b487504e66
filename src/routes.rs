//! Top-level router configuration combining the API and the client app.
//!
//! # Route Structure
//!
//! - `/api/*`  - JSON API (see [`crate::api::routes`])
//! - anything else - built client from `STATIC_DIR` in production, then the
//!   not-found fallback
//!
//! # Middleware (outermost first)
//!
//! - **Path normalization** - Trailing slash handling
//! - **Tracing** - Structured request/response logging
//! - **Security headers** - Applied to every response, including 404s
//! - **Path guard** - Sensitive files answer like unknown routes
//! - **Body limit** - 10 KiB request bodies

use std::path::PathBuf;

use crate::api;
use crate::api::handlers::fallback_handler;
use crate::api::middleware::{path_guard, security_headers, tracing};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::handler::Handler;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 10 * 1024;

/// Builds the router with all routes and middleware, without path normalization.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `static_dir` - built client directory to serve; `None` in development,
///   where a separate dev server owns the client
pub fn build_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let router = Router::new().nest("/api", api::routes::api_routes(state.behind_proxy));

    let router = match static_dir {
        Some(dir) => {
            let fallback = fallback_handler.with_state(state.clone());
            router.fallback_service(ServeDir::new(dir).fallback(fallback))
        }
        None => router.fallback(fallback_handler),
    };

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            path_guard::layer,
        ))
        .layer(middleware::from_fn(security_headers::layer))
        .layer(tracing::layer())
        .with_state(state)
}

/// Constructs the application router with trailing slashes trimmed before routing.
pub fn app_router(state: AppState, static_dir: Option<PathBuf>) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state, static_dir))
}
