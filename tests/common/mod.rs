#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::body::Bytes;
use podcast_site::api::handlers::NotFoundPage;
use podcast_site::api::middleware::PathGuard;
use podcast_site::application::services::{AdminGate, FeedService, GateLimits, SubscriberService};
use podcast_site::domain::clock::{Clock, SystemClock};
use podcast_site::infrastructure::feed::HttpFeedSource;
use podcast_site::infrastructure::persistence::CsvSubscriberRepository;
use podcast_site::state::AppState;

pub const ADMIN_PASSWORD: &str = "test-admin-secret";

/// Feed URL nothing listens on; for tests that never fetch.
pub const UNUSED_FEED_URL: &str = "http://127.0.0.1:9/feed.rss";

pub const INDEX_HTML: &str = "<!doctype html><div id=\"root\"></div>";

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// Scratch directory removed on drop.
pub struct TempDir(PathBuf);

impl TempDir {
    pub fn new() -> Self {
        let dir = std::env::temp_dir().join(format!(
            "podcast-site-it-{}-{}",
            std::process::id(),
            NEXT_DIR.fetch_add(1, Ordering::SeqCst)
        ));
        std::fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn records(&self) -> PathBuf {
        self.0.join("emails.csv")
    }

    /// Creates a built-client directory with an `index.html` and one asset.
    pub fn static_dir(&self) -> PathBuf {
        let dist = self.0.join("dist");
        std::fs::create_dir_all(dist.join("assets")).unwrap();
        std::fs::write(dist.join("index.html"), INDEX_HTML).unwrap();
        std::fs::write(dist.join("assets").join("app-1a2b.js"), "console.log(1)").unwrap();
        dist
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

/// Options for [`create_test_state`].
pub struct TestOptions {
    pub feed_url: String,
    pub feed_timeout: Duration,
    pub behind_proxy: bool,
    pub not_found: NotFoundPage,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            feed_url: UNUSED_FEED_URL.to_string(),
            feed_timeout: Duration::from_secs(2),
            behind_proxy: true,
            not_found: NotFoundPage::Plain,
        }
    }
}

impl TestOptions {
    pub fn production() -> Self {
        Self {
            not_found: NotFoundPage::Spa(Bytes::from_static(INDEX_HTML.as_bytes())),
            ..Self::default()
        }
    }
}

/// Builds an [`AppState`] whose record file lives in `dir`.
///
/// Must run inside a Tokio runtime.
pub fn create_test_state(dir: &TempDir, options: TestOptions) -> AppState {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let source = HttpFeedSource::new(options.feed_url, options.feed_timeout).unwrap();
    let repository = Arc::new(CsvSubscriberRepository::spawn(dir.records()));

    AppState {
        feed_service: Arc::new(FeedService::new(Arc::new(source))),
        subscriber_service: Arc::new(SubscriberService::new(repository, clock.clone())),
        admin_gate: Arc::new(AdminGate::new(
            ADMIN_PASSWORD.to_string(),
            GateLimits::default(),
            clock,
        )),
        path_guard: Arc::new(PathGuard::new(&dir.records())),
        not_found: Arc::new(options.not_found),
        behind_proxy: options.behind_proxy,
    }
}

/// Number of data rows (header excluded) in the record file.
pub fn data_rows(dir: &TempDir) -> Vec<String> {
    std::fs::read_to_string(dir.records())
        .unwrap_or_default()
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

pub const PODCAST_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Night &amp;amp; Day</title>
    <link>https://example.com</link>
    <description>&lt;p&gt;Weekly &lt;b&gt;talk&lt;/b&gt;&lt;/p&gt;</description>
    <itunes:image href="https://cdn.example.com/cover.jpg"/>
    <item>
      <title>Episode 2: &lt;script&gt;alert(1)&lt;/script&gt;Hello</title>
      <link>https://example.com/2</link>
      <pubDate>Tue, 02 Jan 2024 10:00:00 +0000</pubDate>
      <description>&lt;p&gt;Second &amp;quot;episode&amp;quot;&lt;/p&gt;</description>
      <enclosure url="https://cdn.example.com/2.mp3" length="123" type="audio/mpeg"/>
      <itunes:duration>1830</itunes:duration>
      <itunes:episode>2</itunes:episode>
      <itunes:season>1</itunes:season>
    </item>
    <item>
      <title>Episode 1</title>
      <description>First</description>
      <itunes:image href="https://cdn.example.com/1.jpg"/>
    </item>
  </channel>
</rss>
"#;
