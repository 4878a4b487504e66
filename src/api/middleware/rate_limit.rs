//! Rate limiting middleware using token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};

use super::client_identity::ClientIdentityKeyExtractor;

pub type SubscribeGovernor =
    GovernorLayer<ClientIdentityKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Creates the rate limiter guarding newsletter signups.
///
/// # Limits
///
/// - **Rate**: one token replenished every 500 ms (2 requests per second)
/// - **Burst**: 20 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Key Extraction
///
/// Buckets are keyed by [`crate::api::middleware::client_identity::ClientIdentity`],
/// so `behind_proxy` must match the setting used by the handlers.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/subscribe", post(subscribe_handler))
///     .layer(rate_limit::subscribe_layer(false));
/// ```
pub fn subscribe_layer(behind_proxy: bool) -> SubscribeGovernor {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(500)
            .burst_size(20)
            .key_extractor(ClientIdentityKeyExtractor { behind_proxy })
            .finish()
            .unwrap(),
    );

    GovernorLayer::new(governor_conf)
}
