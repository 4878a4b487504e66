//! CLI administration tool for podcast-site.
//!
//! Works directly on the subscriber record file and the configured feed, so
//! the operator does not need the HTTP server running.
//!
//! # Usage
//!
//! ```bash
//! # Subscriber records
//! cargo run --bin admin -- subscribers count
//! cargo run --bin admin -- subscribers list
//! cargo run --bin admin -- subscribers add listener@example.com
//! cargo run --bin admin -- subscribers export --output backup.csv
//!
//! # Preview the normalized feed
//! cargo run --bin admin -- feed preview --limit 5
//!
//! # Validate configuration
//! cargo run --bin admin -- config check
//! ```
//!
//! # Environment Variables
//!
//! - `SUBSCRIBERS_FILE` (default `emails.csv`): record file, overridable with `--file`
//! - `ADMIN_PASSWORD`: required by `subscribers export` and `config check`
//! - `FEED_URL`, `FEED_TIMEOUT_SECS`: used by `feed preview`

use podcast_site::application::services::{
    AdminGate, FeedService, GateLimits, SubscriberService,
};
use podcast_site::config::{self, DEFAULT_FEED_URL};
use podcast_site::domain::clock::{Clock, SystemClock};
use podcast_site::domain::errors::StoreError;
use podcast_site::infrastructure::feed::HttpFeedSource;
use podcast_site::infrastructure::persistence::CsvSubscriberRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Password};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// CLI tool for managing podcast-site.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Subscriber record file (defaults to $SUBSCRIBERS_FILE or emails.csv)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage newsletter subscribers
    Subscribers {
        #[command(subcommand)]
        action: SubscribersAction,
    },

    /// Inspect the podcast feed
    Feed {
        #[command(subcommand)]
        action: FeedAction,
    },

    /// Configuration tools
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Subscriber subcommands.
#[derive(Subcommand)]
enum SubscribersAction {
    /// Show the number of subscribers
    Count,

    /// List subscribers with signup time
    List,

    /// Add a subscriber (same validation as the signup form)
    Add {
        /// Email address
        email: String,
    },

    /// Export the record file (asks for the admin password)
    Export {
        /// Destination file
        #[arg(short, long)]
        output: PathBuf,

        /// Overwrite without confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Feed subcommands.
#[derive(Subcommand)]
enum FeedAction {
    /// Fetch and normalize the configured feed, then print its episodes
    Preview {
        /// Number of episodes to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

/// Configuration subcommands.
#[derive(Subcommand)]
enum ConfigAction {
    /// Load and validate configuration from the environment
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let file = cli.file.unwrap_or_else(|| {
        std::env::var("SUBSCRIBERS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("emails.csv"))
    });

    match cli.command {
        Commands::Subscribers { action } => handle_subscribers_action(action, &file).await?,
        Commands::Feed { action } => handle_feed_action(action).await?,
        Commands::Config { action } => handle_config_action(action)?,
    }

    Ok(())
}

/// Dispatches subscriber commands.
async fn handle_subscribers_action(action: SubscribersAction, file: &Path) -> Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let repository = Arc::new(CsvSubscriberRepository::spawn(file));
    let service = SubscriberService::new(repository, clock.clone());

    match action {
        SubscribersAction::Count => count_subscribers(&service, file).await?,
        SubscribersAction::List => list_subscribers(&service, file).await?,
        SubscribersAction::Add { email } => add_subscriber(&service, &email).await?,
        SubscribersAction::Export { output, yes } => {
            export_subscribers(&service, clock, &output, yes).await?
        }
    }

    Ok(())
}

async fn count_subscribers(
    service: &SubscriberService<CsvSubscriberRepository>,
    file: &Path,
) -> Result<()> {
    let count = service
        .count()
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    println!(
        "{} {} in {}",
        "📧".bright_blue(),
        format!("{count} subscriber(s)").bright_white().bold(),
        file.display().to_string().cyan()
    );

    Ok(())
}

/// Lists all subscribers.
///
/// # Output Format
///
/// ```text
/// 📋 Subscribers
///
///   Email                                    Subscribed
///   ───────────────────────────────────────────────────────────────
///   listener@example.com                     2024-01-15 10:30
/// ```
async fn list_subscribers(
    service: &SubscriberService<CsvSubscriberRepository>,
    file: &Path,
) -> Result<()> {
    println!("{}", "📋 Subscribers".bright_blue().bold());
    println!();

    let records = service
        .list()
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    if records.is_empty() {
        println!("{}", "  No subscribers yet".yellow());
        return Ok(());
    }

    println!(
        "  {:<40} {:<20}",
        "Email".bright_white().bold(),
        "Subscribed".bright_white().bold()
    );
    println!("  {}", "─".repeat(63).bright_black());

    for record in &records {
        println!(
            "  {:<40} {}",
            record.email.cyan(),
            record
                .subscribed_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black()
        );
    }

    println!();
    println!(
        "  Total: {}",
        records.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

async fn add_subscriber(
    service: &SubscriberService<CsvSubscriberRepository>,
    email: &str,
) -> Result<()> {
    if service.is_subscribed(email).await? {
        println!("{}", "⚠️  Already subscribed".yellow());
        return Ok(());
    }

    service
        .subscribe(email)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to add subscriber: {}", e))?;

    println!("{}", "✅ Subscriber stored".green().bold());
    Ok(())
}

/// Writes a copy of the record file to `output`.
///
/// Goes through the same admin gate as the HTTP export: the operator must
/// type the configured `ADMIN_PASSWORD`.
async fn export_subscribers(
    service: &SubscriberService<CsvSubscriberRepository>,
    clock: Arc<dyn Clock>,
    output: &Path,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "📤 Export Subscribers".bright_blue().bold());
    println!();

    let secret = std::env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD must be set")?;
    let gate = AdminGate::new(secret, GateLimits::default(), clock);

    let password = Password::new().with_prompt("Admin password").interact()?;
    let grant = gate
        .authorize(&password, "cli")
        .map_err(|e| anyhow::anyhow!("Export refused: {}", e))?;

    if output.exists() && !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("{} exists. Overwrite?", output.display()))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let csv = match service.export_all(grant).await {
        Ok(csv) => csv,
        Err(StoreError::NoRecords) => {
            println!("{}", "⚠️  No emails collected yet".yellow());
            return Ok(());
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to export: {}", e)),
    };

    tokio::fs::write(output, &csv)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} {} bytes written to {}",
        "✅".green(),
        csv.len(),
        output.display().to_string().cyan()
    );

    Ok(())
}

/// Dispatches feed commands.
async fn handle_feed_action(action: FeedAction) -> Result<()> {
    match action {
        FeedAction::Preview { limit } => preview_feed(limit).await,
    }
}

async fn preview_feed(limit: usize) -> Result<()> {
    let url = std::env::var("FEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string());
    let timeout_secs: u64 = match std::env::var("FEED_TIMEOUT_SECS") {
        Ok(raw) => raw.parse().context("FEED_TIMEOUT_SECS must be a number")?,
        Err(_) => 10,
    };

    println!("{} {}", "📡 Fetching".bright_blue().bold(), url.cyan());
    println!();

    let source = HttpFeedSource::new(url, Duration::from_secs(timeout_secs))?;
    let feed = FeedService::new(Arc::new(source))
        .fetch_feed()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to fetch feed: {}", e))?;

    println!("  {}", feed.title.bright_white().bold());
    println!("  {}", feed.description.bright_black());
    println!();

    for item in feed.items.iter().take(limit) {
        let date = item
            .published_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        let episode = item.episode_number.as_deref().unwrap_or("-");

        println!(
            "  {} {:>4}  {}",
            date.bright_black(),
            episode.yellow(),
            item.title.cyan()
        );
    }

    println!();
    println!(
        "  Showing {} of {} episode(s)",
        limit.min(feed.items.len()).to_string().bright_white().bold(),
        feed.items.len()
    );

    Ok(())
}

/// Dispatches configuration commands.
fn handle_config_action(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Check => {
            let config = config::load_from_env()?;

            println!("{}", "✅ Configuration is valid".green().bold());
            println!();
            println!("  Listen:       {}", config.listen_addr.cyan());
            println!("  Environment:  {:?}", config.environment);
            println!("  Feed:         {}", config.feed_url.cyan());
            println!(
                "  Subscribers:  {}",
                config.subscribers_file.display().to_string().cyan()
            );
            println!("  Behind proxy: {}", config.behind_proxy);
            println!(
                "  Admin limit:  {} attempts / {}s",
                config.admin_max_attempts, config.admin_window_secs
            );
            println!();
        }
    }

    Ok(())
}
