//! Application layer services implementing business logic.
//!
//! Services consume the domain traits and expose the operations the HTTP
//! handlers and the admin CLI call.
//!
//! # Available Services
//!
//! - [`services::feed_service::FeedService`] - Upstream feed fetch and normalization
//! - [`services::subscriber_service::SubscriberService`] - Email signup and export
//! - [`services::admin_gate::AdminGate`] - Rate-limited password check for the export

pub mod services;
