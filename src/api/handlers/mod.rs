//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to one endpoint.

pub mod download;
pub mod feed;
pub mod health;
pub mod not_found;
pub mod subscribe;

pub use download::download_handler;
pub use feed::feed_handler;
pub use health::health_handler;
pub use not_found::{NotFoundPage, fallback_handler};
pub use subscribe::subscribe_handler;
