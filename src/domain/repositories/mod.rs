//! Storage and upstream port definitions for the domain layer.
//!
//! Traits here are implemented in `crate::infrastructure`; mock
//! implementations are generated with `mockall` for unit tests.
//!
//! - [`SubscriberRepository`] - Subscriber record storage
//! - [`FeedSource`] - Raw upstream feed retrieval

pub mod feed_source;
pub mod subscriber_repository;

pub use feed_source::FeedSource;
pub use subscriber_repository::{PutOutcome, SubscriberRepository};

#[cfg(test)]
pub use feed_source::MockFeedSource;
#[cfg(test)]
pub use subscriber_repository::MockSubscriberRepository;
