//! # Podcast Site
//!
//! Backend for a podcast website built with Axum: it republishes the show's
//! RSS feed as clean JSON, collects newsletter signups into a CSV file and
//! lets the operator download that file behind a rate-limited password.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Entities, error types and port traits
//! - **Application Layer** ([`application`]) - Feed normalization, subscriptions, admin gate
//! - **Infrastructure Layer** ([`infrastructure`]) - HTTP feed client and CSV record store
//! - **API Layer** ([`api`]) - Handlers, DTOs and middleware (path guard, rate limiting)
//!
//! ## Features
//!
//! - Feed text stripped of markup and character references before it leaves the server
//! - Single-writer subscriber store; duplicate signups are indistinguishable from new ones
//! - Timing-safe admin password check with per-client attempt windows
//! - Sensitive files (record file, config, sources) answer exactly like unknown routes
//!
//! ## Quick Start
//!
//! ```bash
//! export ADMIN_PASSWORD="change-me"
//! export FEED_URL="https://feeds.buzzsprout.com/285939.rss"  # Optional
//!
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;
pub mod telemetry;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{AdminGate, FeedService, SubscriberService};
    pub use crate::domain::entities::{Feed, FeedItem, SubscriberRecord};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
