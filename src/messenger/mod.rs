//! Completion digests
//!
//! The engine only ever calls [`Messenger::add_line`]. Lines pile up for the
//! whole batch and are flushed with a single [`Messenger::send`] once the batch
//! is evaluated and persisted, so one run produces one digest.

mod sink;

pub use sink::{sink_from_settings, DigestPayload, DigestSink, LogSink, WebhookSink};

use std::sync::Mutex;

use anyhow::Result;

/// Kind of item a digest line refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Challenge,
    Reward,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Challenge => "Challenge",
            Self::Reward => "Reward",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accumulates completion lines and delivers them as one digest.
///
/// Implementations must tolerate concurrent `add_line` calls from several
/// evaluation workers; line order carries no meaning.
pub trait Messenger: Send + Sync {
    fn add_line(&self, user_id: &str, kind: ItemKind, item_id: &str);

    fn line_count(&self) -> usize;

    /// Deliver everything accumulated so far under `label`
    fn send(&self, label: &str) -> Result<()>;
}

/// Format a single digest line
pub fn format_line(user_id: &str, kind: ItemKind, item_id: &str) -> String {
    format!("User {} completed {} {}", user_id, kind, item_id)
}

/// Buffering messenger that hands the digest to a [`DigestSink`]
pub struct DigestMessenger {
    lines: Mutex<Vec<String>>,
    sink: Box<dyn DigestSink>,
}

impl DigestMessenger {
    pub fn new(sink: Box<dyn DigestSink>) -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            sink,
        }
    }

    /// Messenger that only logs its digest
    pub fn logging() -> Self {
        Self::new(Box::new(LogSink))
    }

    /// Snapshot of the pending lines
    pub fn lines(&self) -> Vec<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        // Lines are pushed whole, so a poisoned buffer is still consistent.
        self.lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Messenger for DigestMessenger {
    fn add_line(&self, user_id: &str, kind: ItemKind, item_id: &str) {
        self.lock().push(format_line(user_id, kind, item_id));
    }

    fn line_count(&self) -> usize {
        self.lock().len()
    }

    fn send(&self, label: &str) -> Result<()> {
        let lines = self.lines();
        if lines.is_empty() {
            tracing::debug!("No completions to report for '{}'", label);
            return Ok(());
        }

        self.sink.deliver(&DigestPayload {
            label: label.to_string(),
            lines: lines.clone(),
        })?;

        // Only drop what was delivered; lines added meanwhile stay queued.
        let mut pending = self.lock();
        let delivered = lines.len().min(pending.len());
        pending.drain(..delivered);
        Ok(())
    }
}
