//! # me-api CLI
//!
//! The `me-api` binary manages and serves the portfolio database.
//!
//! ## Usage
//!
//! ```bash
//! me-api --config ./config/me-api.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `me-api init` | Create the SQLite database and all tables |
//! | `me-api seed <file>` | Load a JSON seed file into the database |
//! | `me-api serve` | Start the HTTP API server |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the database
//! me-api init --config ./config/me-api.toml
//!
//! # Load the portfolio content
//! me-api seed data/seed.json --config ./config/me-api.toml
//!
//! # Start the API server
//! me-api serve --config ./config/me-api.toml
//! ```

mod auth;
mod categories;
mod config;
mod db;
mod experience;
mod migrate;
mod models;
mod present;
mod profile;
mod projects;
mod search;
mod seed;
mod server;
mod skills;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// me-api CLI — a personal portfolio content API over SQLite.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/me-api.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "me-api",
    about = "me-api — a personal portfolio content API over SQLite",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/me-api.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables (profile,
    /// skills, projects, work experience, education, links, categories,
    /// and the three junction tables). This command is idempotent —
    /// running it multiple times is safe.
    Init,

    /// Load a JSON seed file into the database.
    ///
    /// Upserts the profile, links, skills, and categories, then reloads
    /// projects, work experience, and education from the file. Junction
    /// associations are given by name and resolved to ids during the load.
    Seed {
        /// Path to the seed file.
        #[arg(default_value = "./data/seed.json")]
        file: PathBuf,
    },

    /// Start the HTTP API server.
    ///
    /// Binds to the address configured in `[server].bind` and serves the
    /// portfolio endpoints.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "me_api=info,tower_http=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Seed { file } => {
            seed::run_seed(&cfg, &file).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
