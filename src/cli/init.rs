//! Init command implementation

use anyhow::{bail, Result};
use std::path::PathBuf;

use ecochallenge::config::Config;
use ecochallenge::store::EcoStore;

/// Default configuration content for ecochallenge init
pub const DEFAULT_CONFIG: &str = r#"# Eco challenge configuration
# ===========================
#
# Rewards are loaded with `ecochallenge catalog import <catalog.yaml>`,
# measurements with `ecochallenge import <measurements.json>`.

[settings]
# SQLite database (defaults to ~/.ecochallenge/eco.db)
# database_path = "/var/lib/ecochallenge/eco.db"

# ============================================================================
# EVALUATION
# ============================================================================
#
#   workers                - Threads evaluating users in parallel (default: 1)
#   schedule_interval_secs - Seconds between runs of `ecochallenge schedule` (default: 86400)

[settings.evaluation]
workers = 1
schedule_interval_secs = 86400

# ============================================================================
# MESSENGER - where the completion digest goes after each run
# ============================================================================
#
#   sink         - "log" writes the digest to the log, "webhook" POSTs it as JSON
#   webhook_url  - Endpoint for the webhook sink
#   recipients   - Addresses forwarded with each digest
#   digest_label - Subject of each digest
#   timeout_secs - Webhook request timeout

[settings.messenger]
sink = "log"
# webhook_url = "https://hooks.example.org/eco"
recipients = []
digest_label = "Eco challenge digest"
timeout_secs = 10
"#;

/// Write the default config (unless present) and create the database
pub async fn init_command(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::install(&config_path, DEFAULT_CONFIG)?;
    println!("Created: {}", config_path.display());

    let db_path = config.database_path();
    EcoStore::open(&db_path)?;
    println!("Database: {}", db_path.display());

    Ok(())
}
