//! API route configuration.

use crate::api::handlers::{download_handler, feed_handler, health_handler, subscribe_handler};
use crate::api::middleware::rate_limit;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All API routes, mounted under `/api`.
///
/// # Endpoints
///
/// - `GET  /feed`            - Normalized podcast feed
/// - `POST /subscribe`       - Newsletter signup (token-bucket limited per client)
/// - `POST /download-emails` - Password-protected subscriber export
/// - `GET  /health`          - Health check
///
/// `behind_proxy` selects how the signup limiter identifies clients and must
/// match [`AppState::behind_proxy`].
pub fn api_routes(behind_proxy: bool) -> Router<AppState> {
    let signup = Router::new()
        .route("/subscribe", post(subscribe_handler))
        .layer(rate_limit::subscribe_layer(behind_proxy));

    Router::new()
        .route("/feed", get(feed_handler))
        .route("/download-emails", post(download_handler))
        .route("/health", get(health_handler))
        .merge(signup)
}
