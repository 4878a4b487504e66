//! Feed retrieval and normalization service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rss::{Channel, Item};

use crate::domain::entities::{Feed, FeedItem};
use crate::domain::errors::FeedError;
use crate::domain::repositories::FeedSource;
use crate::utils::sanitize::sanitize_text;

/// Service that turns the configured upstream feed into a [`Feed`].
///
/// The source is fixed at construction time; nothing a client sends can change
/// which URL is fetched.
pub struct FeedService<S: FeedSource> {
    source: Arc<S>,
}

impl<S: FeedSource> FeedService<S> {
    /// Creates a new feed service over `source`.
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Fetches, parses and sanitizes the feed.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] when the fetch fails, times out or the document
    /// is not a readable RSS feed. The cause is logged here; callers are
    /// expected to report only a generic failure.
    pub async fn fetch_feed(&self) -> Result<Feed, FeedError> {
        let result = match self.source.fetch().await {
            Ok(bytes) => parse_feed(&bytes),
            Err(e) => Err(e),
        };

        match &result {
            Ok(feed) => {
                tracing::debug!(items = feed.items.len(), "Feed fetched");
                metrics::counter!("feed_fetch_total", "outcome" => "ok").increment(1);
            }
            Err(e) => {
                tracing::error!(error = %e, "Feed fetch failed");
                metrics::counter!("feed_fetch_total", "outcome" => "error").increment(1);
            }
        }

        result
    }
}

/// Parses an RSS document and maps it onto the normalized feed schema.
///
/// # Field Mapping
///
/// - `title` / `description` / item `title` - sanitized to plain text
/// - item `summary` - sanitized `content:encoded`, else `description`
/// - item `audio_url` - enclosure URL, unmodified
/// - `duration` / `episode_number` / `season_number` - iTunes values, unmodified
/// - item `image_url` - iTunes episode image, else the feed image
/// - feed `image` - iTunes channel image, else the RSS `<image>` URL
///
/// Empty strings are treated as absent.
///
/// # Errors
///
/// Returns [`FeedError::Parse`] if the bytes are not a valid RSS channel.
pub fn parse_feed(bytes: &[u8]) -> Result<Feed, FeedError> {
    let channel = Channel::read_from(bytes).map_err(|e| FeedError::Parse(e.to_string()))?;

    let image = non_empty(channel.itunes_ext().and_then(|ext| ext.image()))
        .or_else(|| non_empty(channel.image().map(|img| img.url())));

    let items = channel
        .items()
        .iter()
        .map(|item| normalize_item(item, image.as_deref()))
        .collect();

    Ok(Feed {
        title: sanitize_text(channel.title()),
        description: sanitize_text(channel.description()),
        image,
        items,
    })
}

fn normalize_item(item: &Item, feed_image: Option<&str>) -> FeedItem {
    let itunes = item.itunes_ext();

    let summary = non_empty(item.content())
        .or_else(|| non_empty(item.description()))
        .map(|text| sanitize_text(&text))
        .unwrap_or_default();

    let image_url = non_empty(itunes.and_then(|ext| ext.image()))
        .or_else(|| feed_image.map(str::to_string));

    FeedItem {
        title: sanitize_text(item.title().unwrap_or_default()),
        link: non_empty(item.link()),
        published_at: item.pub_date().and_then(parse_pub_date),
        summary,
        audio_url: non_empty(item.enclosure().map(|enc| enc.url())),
        duration: non_empty(itunes.and_then(|ext| ext.duration())),
        episode_number: non_empty(itunes.and_then(|ext| ext.episode())),
        season_number: non_empty(itunes.and_then(|ext| ext.season())),
        image_url,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// RSS dates are RFC 2822; some publishers emit RFC 3339 instead.
fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockFeedSource;
    use chrono::TimeZone;

    const PODCAST_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>The Stormpod &amp;amp; Friends</title>
    <link>https://example.com</link>
    <description>&lt;p&gt;A show about &lt;b&gt;books&lt;/b&gt;&lt;/p&gt;</description>
    <itunes:image href="https://cdn.example.com/show.jpg"/>
    <item>
      <title>Tony&amp;amp;#x27;s Episode</title>
      <link>https://example.com/ep2</link>
      <pubDate>Tue, 02 Jan 2024 10:00:00 +0000</pubDate>
      <description>&lt;p&gt;Second &amp;quot;episode&amp;quot;&lt;/p&gt;</description>
      <enclosure url="https://cdn.example.com/ep2.mp3?a=1&amp;b=2" length="123" type="audio/mpeg"/>
      <itunes:duration>01:02:03</itunes:duration>
      <itunes:episode>2</itunes:episode>
      <itunes:season>1</itunes:season>
      <itunes:image href="https://cdn.example.com/ep2.jpg"/>
    </item>
    <item>
      <title>Trailer</title>
      <description>Just a trailer</description>
      <pubDate>not a date</pubDate>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_feed_channel_fields() {
        let feed = parse_feed(PODCAST_FEED.as_bytes()).unwrap();

        assert_eq!(feed.title, "The Stormpod & Friends");
        assert_eq!(feed.description, "A show about books");
        assert_eq!(feed.image.as_deref(), Some("https://cdn.example.com/show.jpg"));
        assert_eq!(feed.items.len(), 2);
    }

    #[test]
    fn test_parse_feed_full_item() {
        let feed = parse_feed(PODCAST_FEED.as_bytes()).unwrap();
        let item = &feed.items[0];

        assert_eq!(item.title, "Tony's Episode");
        assert_eq!(item.link.as_deref(), Some("https://example.com/ep2"));
        assert_eq!(
            item.published_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap())
        );
        assert_eq!(item.summary, "Second \"episode\"");
        assert_eq!(
            item.audio_url.as_deref(),
            Some("https://cdn.example.com/ep2.mp3?a=1&b=2")
        );
        assert_eq!(item.duration.as_deref(), Some("01:02:03"));
        assert_eq!(item.episode_number.as_deref(), Some("2"));
        assert_eq!(item.season_number.as_deref(), Some("1"));
        assert_eq!(item.image_url.as_deref(), Some("https://cdn.example.com/ep2.jpg"));
    }

    #[test]
    fn test_parse_feed_missing_optional_fields() {
        let feed = parse_feed(PODCAST_FEED.as_bytes()).unwrap();
        let item = &feed.items[1];

        assert_eq!(item.title, "Trailer");
        assert!(item.link.is_none());
        assert!(item.published_at.is_none());
        assert!(item.audio_url.is_none());
        assert!(item.duration.is_none());
        assert!(item.episode_number.is_none());
        assert!(item.season_number.is_none());
        assert_eq!(item.image_url.as_deref(), Some("https://cdn.example.com/show.jpg"));
    }

    #[test]
    fn test_parse_feed_falls_back_to_rss_image() {
        let xml = r#"<rss version="2.0"><channel>
            <title>Show</title><link>https://e.com</link><description>d</description>
            <image><url>https://e.com/logo.png</url><title>Show</title><link>https://e.com</link></image>
            <item><title>One</title></item>
        </channel></rss>"#;

        let feed = parse_feed(xml.as_bytes()).unwrap();

        assert_eq!(feed.image.as_deref(), Some("https://e.com/logo.png"));
        assert_eq!(feed.items[0].image_url.as_deref(), Some("https://e.com/logo.png"));
    }

    #[test]
    fn test_parse_feed_without_any_image() {
        let xml = r#"<rss version="2.0"><channel>
            <title>Show</title><link>https://e.com</link><description>d</description>
            <item><title>One</title></item>
        </channel></rss>"#;

        let feed = parse_feed(xml.as_bytes()).unwrap();

        assert!(feed.image.is_none());
        assert!(feed.items[0].image_url.is_none());
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        let result = parse_feed(b"<html><body>nope</body></html>");
        assert!(matches!(result, Err(FeedError::Parse(_))));
    }

    #[test]
    fn test_parse_pub_date_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();

        assert_eq!(parse_pub_date("Tue, 02 Jan 2024 10:00:00 GMT"), Some(expected));
        assert_eq!(parse_pub_date("2024-01-02T10:00:00Z"), Some(expected));
        assert_eq!(parse_pub_date("yesterday"), None);
    }

    #[tokio::test]
    async fn test_fetch_feed_success() {
        let mut source = MockFeedSource::new();
        source
            .expect_fetch()
            .times(1)
            .returning(|| Ok(PODCAST_FEED.as_bytes().to_vec()));

        let service = FeedService::new(Arc::new(source));
        let feed = service.fetch_feed().await.unwrap();

        assert_eq!(feed.items.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_feed_propagates_source_error() {
        let mut source = MockFeedSource::new();
        source
            .expect_fetch()
            .times(1)
            .returning(|| Err(FeedError::Status(503)));

        let service = FeedService::new(Arc::new(source));
        let result = service.fetch_feed().await;

        assert!(matches!(result, Err(FeedError::Status(503))));
    }
}
