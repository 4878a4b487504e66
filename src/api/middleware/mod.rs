//! HTTP middleware for request processing and protection.
//!
//! Provides sensitive-path blocking, client identification, rate limiting,
//! response hardening and observability middleware.

pub mod client_identity;
pub mod path_guard;
pub mod rate_limit;
pub mod security_headers;
pub mod tracing;

pub use client_identity::ClientIdentity;
pub use path_guard::PathGuard;
