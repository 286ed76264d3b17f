//! Configuration loading and management

mod io;
mod settings;

pub use settings::{EvaluationSettings, MessengerSettings, Settings, SinkKind};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub settings: Settings,
}

impl Config {
    /// Database path from settings, or ~/.ecochallenge/eco.db
    pub fn database_path(&self) -> PathBuf {
        self.settings
            .database_path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("eco.db"))
    }
}
