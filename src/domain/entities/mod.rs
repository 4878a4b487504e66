//! Core domain entities.
//!
//! Plain data structures without I/O:
//!
//! - [`Feed`] / [`FeedItem`] - Normalized podcast feed, rebuilt on every fetch
//! - [`SubscriberRecord`] - One email signup, keyed by normalized address
//! - [`AttemptWindow`] - Ephemeral admin attempt counter for one client

pub mod attempt;
pub mod feed;
pub mod subscriber;

pub use attempt::AttemptWindow;
pub use feed::{Feed, FeedItem};
pub use subscriber::SubscriberRecord;
