//! Port for retrieving the raw upstream feed document.

use crate::domain::errors::FeedError;
use async_trait::async_trait;

/// Fetches the configured feed document.
///
/// Implementations always fetch the single trusted URL they were built with;
/// callers cannot choose the target.
///
/// # Implementations
///
/// - [`crate::infrastructure::feed::HttpFeedSource`] - reqwest client with timeout
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Returns the raw feed bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] on timeout, transport failure or a non-success status.
    async fn fetch(&self) -> Result<Vec<u8>, FeedError>;
}
