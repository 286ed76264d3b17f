//! Exclusive lock serializing evaluation batches against one database

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use fs2::FileExt;

use super::EcoStore;

/// Held for the duration of one evaluation batch.
///
/// Two batches over the same database would both complete the same challenge
/// and announce it twice, so a second batch is refused while one is running.
/// The lock is released on drop.
#[derive(Debug)]
pub struct BatchLock {
    file: Option<File>,
    path: Option<PathBuf>,
}

impl BatchLock {
    /// Take the lock file next to `db_path`, failing if another batch holds it
    pub fn acquire(db_path: &Path) -> Result<Self> {
        let lock_path = db_path.with_extension("db.lock");
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;

        if file.try_lock_exclusive().is_err() {
            bail!(
                "Another evaluation is already running against {}\n(lock held on {})",
                db_path.display(),
                lock_path.display()
            );
        }

        Ok(Self {
            file: Some(file),
            path: Some(lock_path),
        })
    }

    /// Lock file in use, if the store is on disk
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Drop for BatchLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            // Closing the handle releases the lock as well
            let _ = FileExt::unlock(&file);
        }
    }
}

impl EcoStore {
    /// Serialize evaluation batches. In-memory stores are private to one
    /// process, so their lock is a no-op.
    pub fn lock_batch(&self) -> Result<BatchLock> {
        match self.path() {
            Some(path) => BatchLock::acquire(path),
            None => Ok(BatchLock {
                file: None,
                path: None,
            }),
        }
    }
}
