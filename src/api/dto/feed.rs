//! DTOs for the feed endpoint.

use chrono::SecondsFormat;
use serde::Serialize;

use crate::domain::entities::{Feed, FeedItem};

/// `GET /api/feed` response.
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub items: Vec<FeedItemDto>,
}

/// One episode as rendered by the client.
///
/// Absent optional fields serialize as `null`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItemDto {
    pub title: String,
    pub link: Option<String>,
    /// RFC 3339, UTC, millisecond precision.
    pub published_at: Option<String>,
    pub summary: String,
    pub audio_url: Option<String>,
    pub duration: Option<String>,
    pub episode_number: Option<String>,
    pub season_number: Option<String>,
    pub image_url: Option<String>,
}

impl From<FeedItem> for FeedItemDto {
    fn from(item: FeedItem) -> Self {
        Self {
            title: item.title,
            link: item.link,
            published_at: item
                .published_at
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            summary: item.summary,
            audio_url: item.audio_url,
            duration: item.duration,
            episode_number: item.episode_number,
            season_number: item.season_number,
            image_url: item.image_url,
        }
    }
}

impl From<Feed> for FeedResponse {
    fn from(feed: Feed) -> Self {
        Self {
            title: feed.title,
            description: feed.description,
            image: feed.image,
            items: feed.items.into_iter().map(FeedItemDto::from).collect(),
        }
    }
}
