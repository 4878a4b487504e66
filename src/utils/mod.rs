//! Input sanitization helpers shared across the crate.
//!
//! All functions here are pure; none perform I/O.
//!
//! - [`sanitize`] - Feed text cleanup and CSV field neutralization
//! - [`email`] - Email allow-list validation and normalization
//! - [`url_guard`] - Outbound URL allow-list (SSRF guard)
//! - [`constant_time`] - Timing-independent secret comparison

pub mod constant_time;
pub mod email;
pub mod sanitize;
pub mod url_guard;
