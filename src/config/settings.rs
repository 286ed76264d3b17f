//! Settings configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// General settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// SQLite database location (defaults to ~/.ecochallenge/eco.db)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Batch evaluation settings
    #[serde(default)]
    pub evaluation: EvaluationSettings,

    /// Digest delivery settings
    #[serde(default)]
    pub messenger: MessengerSettings,
}

/// Batch evaluation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSettings {
    /// Threads used to evaluate users in parallel (1 = sequential)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Seconds between runs of `ecochallenge schedule`
    #[serde(default = "default_schedule_interval_secs")]
    pub schedule_interval_secs: u64,
}

fn default_workers() -> usize {
    1
}

fn default_schedule_interval_secs() -> u64 {
    24 * 60 * 60
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            schedule_interval_secs: default_schedule_interval_secs(),
        }
    }
}

/// Where completion digests go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Write the digest to the log
    #[default]
    Log,
    /// POST the digest as JSON to `webhook_url`
    Webhook,
}

/// Digest delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessengerSettings {
    #[serde(default)]
    pub sink: SinkKind,

    /// Endpoint receiving digests when `sink = "webhook"`
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Addresses forwarded with each digest
    #[serde(default)]
    pub recipients: Vec<String>,

    /// Label (subject) of each digest
    #[serde(default = "default_digest_label")]
    pub digest_label: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_digest_label() -> String {
    "Eco challenge digest".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for MessengerSettings {
    fn default() -> Self {
        Self {
            sink: SinkKind::default(),
            webhook_url: None,
            recipients: Vec::new(),
            digest_label: default_digest_label(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
