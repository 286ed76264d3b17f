//! Measurement import

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

use ecochallenge::EcoMeasurement;

/// Import file layout
///
/// ```json
/// {"users": [{"user_id": "u1",
///             "measurements": [{"date_taken": "2024-06-01", "diet": {"beef": 1}}]}]}
/// ```
#[derive(Debug, Deserialize)]
pub struct ImportFile {
    #[serde(default)]
    pub users: Vec<ImportUser>,
}

#[derive(Debug, Deserialize)]
pub struct ImportUser {
    pub user_id: String,
    #[serde(default)]
    pub measurements: Vec<EcoMeasurement>,
}

pub fn parse_import(content: &str) -> Result<ImportFile> {
    serde_json::from_str(content).context("Failed to parse measurement import")
}

/// Upsert every user and measurement in the file
pub async fn import_command(config_path: Option<&Path>, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read import file: {}", file.display()))?;
    let import = parse_import(&content)
        .with_context(|| format!("Invalid import file: {}", file.display()))?;

    let (_, store) = super::open_store(config_path)?;

    let mut measurements = 0;
    for user in &import.users {
        store.upsert_user(&user.user_id)?;
        for m in &user.measurements {
            store.upsert_measurement(&user.user_id, m)?;
            measurements += 1;
        }
        debug!("Imported {} measurements for {}", user.measurements.len(), user.user_id);
    }

    info!("Imported {} measurements for {} users", measurements, import.users.len());
    println!(
        "Imported {} measurements for {} users",
        measurements,
        import.users.len()
    );
    Ok(())
}
