//! Subscriber record persistence.
//!
//! # Repositories
//!
//! - [`CsvSubscriberRepository`] - Append-only CSV file owned by a single writer task

pub mod csv_subscriber_repository;

pub use csv_subscriber_repository::{CSV_HEADER, CsvSubscriberRepository};
