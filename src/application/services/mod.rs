//! Business logic services for the application layer.

pub mod admin_gate;
pub mod feed_service;
pub mod subscriber_service;

pub use admin_gate::{AdminGate, ExportGrant, GateLimits};
pub use feed_service::FeedService;
pub use subscriber_service::SubscriberService;
