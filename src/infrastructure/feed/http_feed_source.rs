//! reqwest-backed feed source.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::errors::FeedError;
use crate::domain::repositories::FeedSource;
use crate::utils::url_guard::is_external_url_allowed;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Largest feed document accepted, in bytes.
const MAX_FEED_BYTES: usize = 10 * 1024 * 1024;

/// Fetches one fixed feed URL over HTTP with a hard timeout.
///
/// The timeout covers the whole exchange (connect, headers and body), so a
/// slow upstream can hold a request handler for at most that long.
pub struct HttpFeedSource {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    max_bytes: usize,
}

impl HttpFeedSource {
    /// Builds a source for `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed (TLS backend
    /// initialization failure).
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .redirect(redirect_policy())
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
            max_bytes: MAX_FEED_BYTES,
        })
    }

    /// Overrides the largest accepted document size.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// The URL this source fetches.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify(&self, e: reqwest::Error) -> FeedError {
        if e.is_timeout() {
            FeedError::Timeout(self.timeout)
        } else {
            FeedError::Request(e.to_string())
        }
    }
}

/// Follows at most five redirects, and never into private or loopback hosts.
fn redirect_policy() -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(|attempt| {
        if attempt.previous().len() >= 5 {
            attempt.error("too many redirects")
        } else if !is_external_url_allowed(attempt.url().as_str()) {
            attempt.error("redirect to a disallowed host")
        } else {
            attempt.follow()
        }
    })
}

fn too_large() -> FeedError {
    FeedError::Request("feed document too large".to_string())
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<Vec<u8>, FeedError> {
        let mut response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(too_large());
        }

        // Content-Length may be absent (chunked) or wrong; count what arrives.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(e))? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}
