//! DTOs for the subscriber export endpoint.

use serde::Deserialize;

use super::lenient_string;

/// Suggested filename for the downloaded export.
pub const EXPORT_FILENAME: &str = "emails.csv";

/// `POST /api/download-emails` body.
///
/// A missing or non-string password is checked as the empty string and still
/// counts against the caller's attempt budget.
#[derive(Debug, Default, Deserialize)]
pub struct DownloadRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: Option<String>,
}
