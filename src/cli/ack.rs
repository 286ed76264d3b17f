//! Ack command implementation

use anyhow::{bail, Result};
use std::path::Path;

/// Mark a user's pending completions as seen
pub async fn ack_command(
    config_path: Option<&Path>,
    user: &str,
    reward: Option<&str>,
) -> Result<()> {
    let (_, store) = super::open_store(config_path)?;

    if store.load_user(user)?.is_none() {
        bail!("Unknown user: {}", user);
    }

    let changed = store.acknowledge(user, reward)?;
    if changed == 0 {
        println!("Nothing to acknowledge.");
    } else {
        println!("Acknowledged {} completions for {}", changed, user);
    }
    Ok(())
}
