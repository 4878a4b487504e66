//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use crate::api::handlers::NotFoundPage;
use crate::api::middleware::PathGuard;
use crate::application::services::{AdminGate, FeedService, SubscriberService};
use crate::infrastructure::feed::HttpFeedSource;
use crate::infrastructure::persistence::CsvSubscriberRepository;

/// Everything a request handler can reach.
///
/// Cloned per request; every field is either `Copy` or behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub feed_service: Arc<FeedService<HttpFeedSource>>,
    pub subscriber_service: Arc<SubscriberService<CsvSubscriberRepository>>,
    pub admin_gate: Arc<AdminGate>,
    pub path_guard: Arc<PathGuard>,
    pub not_found: Arc<NotFoundPage>,
    /// Trust `X-Forwarded-For` / `X-Real-IP` for client identity.
    pub behind_proxy: bool,
}
