//! Infrastructure layer for external integrations.
//!
//! Concrete implementations of the domain ports.
//!
//! # Modules
//!
//! - [`feed`] - HTTP retrieval of the upstream podcast feed
//! - [`persistence`] - CSV-file subscriber store

pub mod feed;
pub mod persistence;
