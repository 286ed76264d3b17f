//! Evaluate command implementation

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{debug, info, warn};

use ecochallenge::config::{Config, Settings};
use ecochallenge::engine::{BatchReport, CancelFlag, Orchestrator};
use ecochallenge::messenger::{sink_from_settings, DigestMessenger, Messenger};
use ecochallenge::store::EcoStore;

/// Run one batch: load, evaluate, persist, then send the digest.
///
/// With `dry_run` nothing is written and the digest lines are printed instead
/// of being sent.
pub fn evaluate_once(
    config: &Config,
    store: &EcoStore,
    user: Option<&str>,
    dry_run: bool,
    cancel: &CancelFlag,
) -> Result<BatchReport> {
    let messenger = DigestMessenger::new(sink_from_settings(&config.settings.messenger)?);
    run_batch(
        &config.settings,
        store,
        &messenger,
        user,
        dry_run,
        Utc::now(),
        cancel,
    )
}

fn run_batch(
    settings: &Settings,
    store: &EcoStore,
    messenger: &DigestMessenger,
    user: Option<&str>,
    dry_run: bool,
    now: DateTime<Utc>,
    cancel: &CancelFlag,
) -> Result<BatchReport> {
    // Held until the digest is sent
    let _lock = store.lock_batch()?;

    let mut users = match user {
        Some(id) => match store.load_user(id)? {
            Some(user) => vec![user],
            None => bail!("Unknown user: {}", id),
        },
        None => store.load_users()?,
    };

    let orchestrator = Orchestrator::with_workers(settings.evaluation.workers);
    let report = orchestrator.run(&mut users, messenger, now, cancel);

    if dry_run {
        for line in messenger.lines() {
            println!("  {}", line);
        }
        return Ok(report);
    }

    let mut rows = 0;
    for user in &users {
        rows += store.save_progress(user)?;
    }
    debug!("Saved progress ({} rows)", rows);

    // Progress is already saved; a failed delivery only loses this digest.
    if let Err(e) = orchestrator.flush(messenger, &settings.messenger.digest_label) {
        warn!(
            "Failed to send digest ({} lines): {:#}",
            messenger.line_count(),
            e
        );
    }

    Ok(report)
}

pub async fn evaluate_command(
    config_path: Option<&Path>,
    user: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let (config, store) = super::open_store(config_path)?;

    if dry_run {
        info!("Dry run: progress will not be saved");
    }

    let report = evaluate_once(&config, &store, user.as_deref(), dry_run, &CancelFlag::new())?;
    println!("Run {}", report.run_id);
    println!("  {}", report);
    Ok(())
}
