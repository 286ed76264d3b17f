use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "ecochallenge")]
#[command(about = "Eco challenges - track daily consumption and complete reward challenges")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.ecochallenge/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file and create the database
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Import users and measurements from a JSON file
    Import {
        /// JSON file: {"users": [{"user_id": ..., "measurements": [...]}]}
        file: PathBuf,
    },

    /// Manage the reward catalog
    Catalog {
        #[command(subcommand)]
        command: cli::catalog::CatalogCommands,
    },

    /// Give users every catalog reward they do not hold yet
    Onboard {
        /// User to onboard
        user: Option<String>,

        /// Onboard every known user
        #[arg(long, conflicts_with = "user")]
        all: bool,
    },

    /// Evaluate challenges once and send the completion digest
    Evaluate {
        /// Only evaluate this user
        #[arg(long)]
        user: Option<String>,

        /// Evaluate without saving progress or sending the digest
        #[arg(long)]
        dry_run: bool,
    },

    /// Evaluate periodically until interrupted (Ctrl-C)
    Schedule {
        /// Seconds between runs (defaults to settings.evaluation.schedule_interval_secs)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Show reward and challenge progress
    Status {
        /// Only show this user
        user: Option<String>,
    },

    /// Acknowledge pending completions for a user
    Ack {
        user: String,

        /// Only acknowledge this reward
        reward: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config_path = cli.config;

    match cli.command {
        Commands::Init { force } => {
            cli::init::init_command(config_path, force).await?;
        }
        Commands::Import { file } => {
            cli::import::import_command(config_path.as_deref(), &file).await?;
        }
        Commands::Catalog { command } => {
            cli::catalog::catalog_command(config_path.as_deref(), command).await?;
        }
        Commands::Onboard { user, all } => {
            cli::onboard::onboard_command(config_path.as_deref(), user, all).await?;
        }
        Commands::Evaluate { user, dry_run } => {
            cli::evaluate::evaluate_command(config_path.as_deref(), user, dry_run).await?;
        }
        Commands::Schedule { interval } => {
            cli::schedule::schedule_command(config_path.as_deref(), interval).await?;
        }
        Commands::Status { user } => {
            cli::status::status_command(config_path.as_deref(), user).await?;
        }
        Commands::Ack { user, reward } => {
            cli::ack::ack_command(config_path.as_deref(), &user, reward.as_deref()).await?;
        }
    }

    Ok(())
}
