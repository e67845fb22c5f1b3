//! Nutbush Movie Night web site (nbmn-web) - Main entry point

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use nbmn_common::config::{load_config, TomlConfig};
use nbmn_common::db::{LoggedStore, SqliteStore};
use nbmn_common::models::ensure_tables;
use nbmn_common::remote::OmdbClient;
use nbmn_web::{build_router, AppState, SiteStore};
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for nbmn-web
#[derive(Parser, Debug)]
#[command(name = "nbmn-web")]
#[command(about = "Nutbush Movie Night web site")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = "NBMN_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "NBMN_PORT")]
    port: Option<u16>,

    /// SQLite database file (overrides the config file)
    #[arg(short, long, env = "NBMN_DATABASE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }

    // The banner is printed, not logged
    if let Some(banner) = config.banner.as_deref().filter(|b| !b.trim().is_empty()) {
        println!("{}", "*".repeat(75));
        println!("{}", banner);
        println!("{}", "*".repeat(75));
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level())),
        )
        .init();

    info!(
        "Starting Nutbush Movie Night (nbmn-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Application logging begin: debug=={}", config.debug);

    // Every page may resolve a movie, so a missing key stops startup
    let omdb = OmdbClient::new(&config.omdb).context("OMDB client")?;

    let store = SqliteStore::open(&config.database_path)
        .await
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;

    if config.log_saves {
        info!("Logging every document save");
        serve(LoggedStore::new(store), omdb, config).await
    } else {
        serve(store, omdb, config).await
    }
}

async fn serve<S: SiteStore>(store: S, omdb: OmdbClient, config: TomlConfig) -> Result<()> {
    ensure_tables(&store).await.context("Failed to create tables")?;

    let state = AppState::new(store, omdb, &config);
    state
        .oligarchs
        .ensure_attendees(&state.store, &[])
        .await
        .context("Failed to create oligarch attendees")?;

    let app = build_router(state);

    let host: std::net::IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid host address '{}'", config.host))?;
    let addr = SocketAddr::from((host, config.port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("nbmn-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received");
}
