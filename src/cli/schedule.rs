//! Periodic evaluation until Ctrl-C

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

use ecochallenge::engine::CancelFlag;

use super::evaluate::evaluate_once;

pub async fn schedule_command(config_path: Option<&Path>, interval: Option<u64>) -> Result<()> {
    let (config, store) = super::open_store(config_path)?;
    let secs = interval
        .unwrap_or(config.settings.evaluation.schedule_interval_secs)
        .max(1);

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping after the current batch");
                cancel.cancel();
            }
        });
    }

    info!("Evaluating every {}s (Ctrl-C to stop)", secs);
    let mut ticker = tokio::time::interval(Duration::from_secs(secs));

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = wait_for_cancel(&cancel) => break,
        }
        if cancel.is_cancelled() {
            break;
        }

        let (config, store, batch_cancel) = (config.clone(), store.clone(), cancel.clone());
        let result = tokio::task::spawn_blocking(move || {
            evaluate_once(&config, &store, None, false, &batch_cancel)
        })
        .await
        .context("Evaluation task panicked")?;

        match result {
            Ok(report) => info!("Run {}: {}", report.run_id, report),
            Err(e) => error!("Evaluation failed: {:#}", e),
        }
    }

    info!("Scheduler stopped");
    Ok(())
}

async fn wait_for_cancel(cancel: &CancelFlag) {
    while !cancel.is_cancelled() {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}
