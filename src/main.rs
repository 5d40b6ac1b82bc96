use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rosterd::config::Config;
use rosterd::notifications::EmailNotifier;
use rosterd::roster::spawn_generation_task;
use rosterd::AppState;

#[derive(Parser, Debug)]
#[command(name = "rosterd")]
#[command(author, version, about = "A lightweight duty roster and shift coverage service", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "rosterd.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Rosterd v{}", env!("CARGO_PKG_VERSION"));

    // Ensure data directory exists
    rosterd::utils::ensure_dir(&config.server.data_dir)?;

    // Initialize database
    let db = rosterd::db::init(&config.server.data_dir).await?;

    // Ensure the bootstrap admin user exists
    rosterd::api::auth::ensure_admin_user(
        &db,
        &config.auth.admin_email,
        &config.auth.admin_password,
    )
    .await?;

    // Seed reference data
    rosterd::db::seed_catalog(&db).await?;
    if config.duties.seed_demo {
        rosterd::db::seed_demo_data(&db).await?;
    }

    // Start the background duty generation task
    spawn_generation_task(db.clone(), config.duties.clone());

    // Create app state
    let notifier = Arc::new(EmailNotifier::new(db.clone(), config.email.clone()));
    let state = Arc::new(AppState::new(config.clone(), db, notifier));

    // Create API router
    let app = rosterd::api::create_router(state);

    // Start API server
    let api_addr = format!("{}:{}", config.server.host, config.server.api_port);
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;

    tracing::info!("API server listening on http://{}", api_addr);
    tracing::info!("Operator token: {}", config.auth.admin_token);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
