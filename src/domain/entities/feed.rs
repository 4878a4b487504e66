//! Normalized podcast feed entities.

use chrono::{DateTime, Utc};

/// One episode, reduced to plain text and pass-through URLs.
///
/// Text fields (`title`, `summary`) never contain markup or unresolved
/// character references. URL fields are copied from the source untouched.
/// `duration`, `episode_number` and `season_number` keep whatever string the
/// publisher supplied; interpreting units is left to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub title: String,
    pub link: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub summary: String,
    pub audio_url: Option<String>,
    pub duration: Option<String>,
    pub episode_number: Option<String>,
    pub season_number: Option<String>,
    /// Episode artwork, or the feed-level image when the episode has none.
    pub image_url: Option<String>,
}

/// A fetched feed with its episodes in source order.
///
/// Built fresh on every fetch and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub items: Vec<FeedItem>,
}
