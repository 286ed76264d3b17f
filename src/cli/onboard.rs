//! Onboard command implementation

use anyhow::{bail, Result};
use std::path::Path;

/// Clone catalog rewards into one user, or into every known user
pub async fn onboard_command(
    config_path: Option<&Path>,
    user: Option<String>,
    all: bool,
) -> Result<()> {
    let (_, store) = super::open_store(config_path)?;

    let user_ids = match (user, all) {
        (Some(id), _) => vec![id],
        (None, true) => store.user_ids()?,
        (None, false) => bail!("Specify a user id or --all"),
    };

    let catalog = store.load_catalog()?;
    if catalog.is_empty() {
        bail!("Catalog is empty.\nLoad rewards first: ecochallenge catalog import <catalog.yaml>");
    }

    let mut added = 0;
    for id in &user_ids {
        added += store.onboard_user(id, &catalog)?;
    }

    println!("Onboarded {} users ({} rewards added)", user_ids.len(), added);
    Ok(())
}
