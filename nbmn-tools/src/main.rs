//! nbmn-tools - maintenance commands for the movie night database

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nbmn_common::config::load_config;
use nbmn_common::db::SqliteStore;
use nbmn_common::models::ensure_tables;
use nbmn_common::remote::OmdbClient;
use nbmn_common::Oligarchs;
use std::path::PathBuf;
use tracing::info;

mod commands;

#[derive(Parser)]
#[command(name = "nbmn-tools")]
#[command(about = "Maintenance commands for the Nutbush Movie Night database", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "NBMN_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file (overrides the config file)
    #[arg(short, long, global = true, env = "NBMN_DATABASE")]
    database: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Force a metadata refresh of every movie
    FixMovies,

    /// Create attendee records for everyone named on a night
    FixPeeps,

    /// List movies that no night refers to
    OrphanMovies {
        /// Delete the orphans
        #[arg(long)]
        delete: bool,

        /// Print each orphan
        #[arg(short, long)]
        verbose: bool,
    },

    /// Copy attendees, nights and movies into another SQLite file
    Export {
        /// Destination database file (created if missing)
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level())),
        )
        .init();

    let store = SqliteStore::open(&config.database_path)
        .await
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;
    ensure_tables(&store).await.context("Failed to create tables")?;
    info!("Using database {}", config.database_path.display());

    match cli.command {
        Commands::FixMovies => {
            let omdb = OmdbClient::new(&config.omdb).context("fix-movies needs OMDB access")?;
            let report = commands::fix_movies(&store, &omdb).await?;
            println!("Refreshed {} movie(s)", report.refreshed);
            for id in &report.failed {
                println!("  failed: {}", id);
            }
        }
        Commands::FixPeeps => {
            let oligarchs = Oligarchs::new(config.oligarchs.iter().cloned());
            let created = commands::fix_peeps(&store, &oligarchs).await?;
            println!("Created {} attendee(s)", created.len());
            for name in &created {
                println!("  {}", name);
            }
        }
        Commands::OrphanMovies { delete, verbose } => {
            let orphans = commands::orphan_movies(&store, delete).await?;
            if verbose {
                for movie in &orphans {
                    println!("{}  {}", movie.imdbid, movie.name);
                }
            }
            let verb = if delete { "Deleted" } else { "Found" };
            println!("{} {} orphan movie(s)", verb, orphans.len());
        }
        Commands::Export { file } => {
            let report = commands::export(&store, &file).await?;
            println!(
                "Exported {} attendee(s), {} night(s), {} movie(s) to {}",
                report.attendees,
                report.nights,
                report.movies,
                file.display()
            );
        }
    }

    Ok(())
}
