use anyhow::Result;
use podcast_site::{config, server, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Refuse to start without a valid config (in particular ADMIN_PASSWORD).
    let config = config::load_from_env()?;

    telemetry::init(&config.log_level, &config.log_format)?;
    config.print_summary();

    server::run(config).await
}
