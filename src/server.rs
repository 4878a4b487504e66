//! HTTP server initialization and runtime setup.
//!
//! Wires the feed client, subscriber store, admin gate and router together
//! and runs the Axum server until Ctrl-C or SIGTERM.

use crate::api::handlers::NotFoundPage;
use crate::api::middleware::PathGuard;
use crate::application::services::{AdminGate, FeedService, GateLimits, SubscriberService};
use crate::config::Config;
use crate::domain::clock::{Clock, SystemClock};
use crate::infrastructure::feed::HttpFeedSource;
use crate::infrastructure::persistence::CsvSubscriberRepository;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::body::Bytes;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;

/// Builds the shared state from configuration.
///
/// In production the client's `index.html` is read once here; its absence is
/// a startup error.
///
/// Must be called inside a Tokio runtime (the subscriber store spawns its
/// writer task).
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or, in production,
/// `STATIC_DIR/index.html` cannot be read.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let feed_source = HttpFeedSource::new(config.feed_url.clone(), config.feed_timeout())
        .context("Failed to build feed HTTP client")?;
    let feed_service = Arc::new(FeedService::new(Arc::new(feed_source)));

    let repository = Arc::new(CsvSubscriberRepository::spawn(
        config.subscribers_file.clone(),
    ));
    let subscriber_service = Arc::new(SubscriberService::new(repository, clock.clone()));

    let limits = GateLimits {
        max_attempts: config.admin_max_attempts,
        window: config.admin_window()?,
    };
    let admin_gate = Arc::new(AdminGate::new(
        config.admin_password.clone(),
        limits,
        clock,
    ));

    let not_found = if config.is_production() {
        let index = config.static_dir.join("index.html");
        let html = tokio::fs::read(&index)
            .await
            .with_context(|| format!("Failed to read {}", index.display()))?;
        NotFoundPage::Spa(Bytes::from(html))
    } else {
        NotFoundPage::Plain
    };

    Ok(AppState {
        feed_service,
        subscriber_service,
        admin_gate,
        path_guard: Arc::new(PathGuard::new(&config.subscribers_file)),
        not_found: Arc::new(not_found),
        behind_proxy: config.behind_proxy,
    })
}

/// Runs the HTTP server with the given configuration.
///
/// # Errors
///
/// Returns an error if:
/// - State construction fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let state = build_state(&config).await?;
    tracing::info!(file = %config.subscribers_file.display(), "Subscriber store ready");

    let static_dir = config.is_production().then(|| config.static_dir.clone());
    let app = app_router(state, static_dir);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
