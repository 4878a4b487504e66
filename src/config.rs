//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//! A `.env` file is honoured when present (loaded in `main.rs` via `dotenvy`).
//!
//! ## Required Variables
//!
//! - `ADMIN_PASSWORD` - Secret guarding the subscriber export. The server refuses
//!   to start without it.
//!
//! ## Optional Variables
//!
//! - `FEED_URL` - Podcast RSS feed (default: the show's Buzzsprout feed)
//! - `FEED_TIMEOUT_SECS` - Upstream fetch timeout (default: 10, range 1-120)
//! - `SUBSCRIBERS_FILE` - Record file path (default: `emails.csv`)
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`, or `0.0.0.0:$PORT`)
//! - `APP_ENV` - `development` or `production` (default: `development`)
//! - `STATIC_DIR` - Built client directory served in production (default: `dist`)
//! - `BEHIND_PROXY` - Trust `X-Forwarded-For` / `X-Real-IP` (default: `false`)
//! - `ADMIN_MAX_ATTEMPTS` - Export attempts per window (default: 5)
//! - `ADMIN_WINDOW_SECS` - Attempt window length (default: 900)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use chrono::TimeDelta;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::url_guard::is_external_url_allowed;

pub const DEFAULT_FEED_URL: &str = "https://feeds.buzzsprout.com/285939.rss";

/// Longest accepted admin attempt window (one week).
pub const MAX_ADMIN_WINDOW_SECS: u64 = 7 * 24 * 60 * 60;

/// Deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Client assets are served by a separate dev server; 404s are bare.
    Development,
    /// The built client is served from `STATIC_DIR`; 404s render the client's not-found view.
    Production,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => anyhow::bail!("APP_ENV must be 'development' or 'production', got '{other}'"),
        }
    }
}

/// Service configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Secret for the subscriber export. Never logged.
    pub admin_password: String,
    pub feed_url: String,
    pub feed_timeout_secs: u64,
    pub subscribers_file: PathBuf,
    pub listen_addr: String,
    pub environment: Environment,
    pub static_dir: PathBuf,
    /// When true, client identity is read from `X-Forwarded-For` / `X-Real-IP`.
    /// Enable only behind a trusted reverse proxy.
    pub behind_proxy: bool,
    pub admin_max_attempts: u32,
    pub admin_window_secs: u64,
    pub log_level: String,
    pub log_format: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("admin_password", &"***")
            .field("feed_url", &self.feed_url)
            .field("feed_timeout_secs", &self.feed_timeout_secs)
            .field("subscribers_file", &self.subscribers_file)
            .field("listen_addr", &self.listen_addr)
            .field("environment", &self.environment)
            .field("static_dir", &self.static_dir)
            .field("behind_proxy", &self.behind_proxy)
            .field("admin_max_attempts", &self.admin_max_attempts)
            .field("admin_window_secs", &self.admin_window_secs)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `ADMIN_PASSWORD` is missing or a variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let admin_password =
            env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD must be set")?;

        let feed_url = env::var("FEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string());
        let feed_timeout_secs = parse_or("FEED_TIMEOUT_SECS", 10)?;

        let subscribers_file = env::var("SUBSCRIBERS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("emails.csv"));

        let listen_addr = Self::load_listen_addr();

        let environment = match env::var("APP_ENV") {
            Ok(value) => value.parse()?,
            Err(_) => Environment::Development,
        };

        let static_dir = env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("dist"));

        let behind_proxy = env::var("BEHIND_PROXY")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        let admin_max_attempts = parse_or("ADMIN_MAX_ATTEMPTS", 5)?;
        let admin_window_secs = parse_or("ADMIN_WINDOW_SECS", 900)?;

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        Ok(Self {
            admin_password,
            feed_url,
            feed_timeout_secs,
            subscribers_file,
            listen_addr,
            environment,
            static_dir,
            behind_proxy,
            admin_max_attempts,
            admin_window_secs,
            log_level,
            log_format,
        })
    }

    /// Resolves the bind address.
    ///
    /// Priority:
    /// 1. `LISTEN`
    /// 2. `0.0.0.0:$PORT`
    /// 3. `0.0.0.0:3000`
    fn load_listen_addr() -> String {
        if let Ok(listen) = env::var("LISTEN") {
            return listen;
        }

        match env::var("PORT") {
            Ok(port) => format!("0.0.0.0:{port}"),
            Err(_) => "0.0.0.0:3000".to_string(),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `admin_password` is empty
    /// - `feed_url` is not an http(s) URL
    /// - `feed_timeout_secs` is outside 1..=120
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is not `host:port`
    /// - the admin attempt limit or window is zero
    pub fn validate(&self) -> Result<()> {
        if self.admin_password.is_empty() {
            anyhow::bail!("ADMIN_PASSWORD must not be empty");
        }

        let feed_url = url::Url::parse(&self.feed_url)
            .with_context(|| format!("FEED_URL is not a valid URL: '{}'", self.feed_url))?;
        if !matches!(feed_url.scheme(), "http" | "https") {
            anyhow::bail!("FEED_URL must use http or https, got '{}'", feed_url.scheme());
        }

        if !(1..=120).contains(&self.feed_timeout_secs) {
            anyhow::bail!(
                "FEED_TIMEOUT_SECS must be between 1 and 120, got {}",
                self.feed_timeout_secs
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if self.admin_max_attempts == 0 {
            anyhow::bail!("ADMIN_MAX_ATTEMPTS must be at least 1");
        }

        if self.admin_window_secs == 0 || self.admin_window_secs > MAX_ADMIN_WINDOW_SECS {
            anyhow::bail!(
                "ADMIN_WINDOW_SECS must be between 1 and {}, got {}",
                MAX_ADMIN_WINDOW_SECS,
                self.admin_window_secs
            );
        }

        Ok(())
    }

    /// Admin attempt window as a signed duration.
    ///
    /// # Errors
    ///
    /// Fails if `admin_window_secs` does not fit a [`TimeDelta`].
    pub fn admin_window(&self) -> Result<TimeDelta> {
        i64::try_from(self.admin_window_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .context("ADMIN_WINDOW_SECS is out of range")
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Prints configuration summary (without the admin secret).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Environment: {:?}", self.environment);
        tracing::info!("  Feed: {} (timeout {}s)", self.feed_url, self.feed_timeout_secs);
        tracing::info!("  Subscribers file: {}", self.subscribers_file.display());
        if self.is_production() {
            tracing::info!("  Static dir: {}", self.static_dir.display());
        }
        tracing::info!("  Behind proxy: {}", self.behind_proxy);
        tracing::info!(
            "  Admin limit: {} attempts / {}s",
            self.admin_max_attempts,
            self.admin_window_secs
        );
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);

        if !is_external_url_allowed(&self.feed_url) {
            tracing::warn!("FEED_URL points at a private or loopback host");
        }
    }
}

fn parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if required variables are missing or validation fails.
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
