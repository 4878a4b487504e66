//! Handler for the podcast feed endpoint.

use axum::{Json, extract::State};

use crate::api::dto::feed::FeedResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the normalized podcast feed.
///
/// # Endpoint
///
/// `GET /api/feed`
///
/// The upstream URL comes from configuration; the request carries no input.
///
/// # Response
///
/// ```json
/// {
///   "title": "The Show",
///   "description": "Weekly conversations",
///   "image": "https://cdn.example.com/cover.jpg",
///   "items": [
///     {
///       "title": "Episode 12",
///       "link": "https://example.com/12",
///       "publishedAt": "2024-03-01T10:00:00.000Z",
///       "summary": "Plain text summary",
///       "audioUrl": "https://cdn.example.com/12.mp3",
///       "duration": "00:42:10",
///       "episodeNumber": "12",
///       "seasonNumber": "2",
///       "imageUrl": "https://cdn.example.com/cover.jpg"
///     }
///   ]
/// }
/// ```
///
/// # Errors
///
/// Returns `500 {"error": "Failed to fetch RSS feed"}` on timeout, upstream
/// error or unparseable document. The cause is logged, never returned.
pub async fn feed_handler(State(state): State<AppState>) -> Result<Json<FeedResponse>, AppError> {
    let feed = state.feed_service.fetch_feed().await?;

    Ok(Json(feed.into()))
}
