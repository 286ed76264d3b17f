//! CLI command implementations

pub mod ack;
pub mod catalog;
pub mod evaluate;
pub mod import;
pub mod init;
pub mod onboard;
pub mod schedule;
pub mod status;

use anyhow::Result;
use std::path::Path;
use tracing::debug;

use ecochallenge::config::Config;
use ecochallenge::store::EcoStore;

/// Load the config and open the database it points to
pub fn open_store(config_path: Option<&Path>) -> Result<(Config, EcoStore)> {
    let config = Config::load(config_path)?;
    let db_path = config.database_path();
    debug!("Using database {}", db_path.display());
    let store = EcoStore::open(&db_path)?;
    Ok((config, store))
}
