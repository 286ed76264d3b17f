//! SQLite storage for users, measurements, catalog and challenge progress
//!
//! Manages `~/.ecochallenge/eco.db` with versioned schema migrations.
//!
//! # Usage
//!
//! ```ignore
//! let store = EcoStore::open(&config.database_path())?;
//! store.upsert_measurement("u1", &measurement)?;
//!
//! let _lock = store.lock_batch()?;
//! let mut users = store.load_users()?;
//! let report = orchestrator.run(&mut users, &messenger, Utc::now(), &cancel);
//! for user in &users {
//!     store.save_progress(user)?;
//! }
//! ```

mod catalog;
mod lock;
mod users;

pub use lock::BatchLock;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;

/// Shared handle to the eco database
#[derive(Clone)]
pub struct EcoStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl EcoStore {
    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open eco db: {}", path.display()))?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::from_connection(conn, Some(path.to_path_buf()))
    }

    /// Private in-memory database (tests, dry runs)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, None)
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Database file, or `None` for an in-memory store
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        // Every write runs in a transaction, so a poisoned lock never guards half a write.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)?;
        drop(conn);
        self.run_migrations()
    }

    /// Run any pending migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn();

        let version: i32 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
            .unwrap_or(0);

        // Migration 2: catalog descriptions
        if version < 2 {
            let has_description: bool = conn
                .prepare(
                    "SELECT COUNT(*) FROM pragma_table_info('reward_challenges')
                     WHERE name = 'description'",
                )
                .and_then(|mut s| s.query_row([], |r| r.get::<_, i32>(0)))
                .map(|c| c > 0)
                .unwrap_or(false);

            if !has_description {
                conn.execute_batch("ALTER TABLE reward_challenges ADD COLUMN description TEXT;")?;
            }
            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (2)", [])?;
        }

        Ok(())
    }

    /// Number of stored users
    pub fn user_count(&self) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
        Ok(count as usize)
    }
}

pub(crate) fn to_millis(at: Option<DateTime<Utc>>) -> Option<i64> {
    at.map(|t| t.timestamp_millis())
}

pub(crate) fn from_millis(ms: Option<i64>) -> Option<DateTime<Utc>> {
    ms.and_then(DateTime::from_timestamp_millis)
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);
INSERT OR IGNORE INTO schema_version VALUES (1);

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    onboarded INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

-- One row per user per calendar day; re-reporting a day updates it in place
CREATE TABLE IF NOT EXISTS measurements (
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    date_taken TEXT NOT NULL,          -- YYYY-MM-DD
    eco_footprint REAL NOT NULL DEFAULT 0,
    diet TEXT NOT NULL,                -- JSON category groups
    transport TEXT NOT NULL,
    electronics TEXT NOT NULL,
    clothing TEXT NOT NULL,
    footwear TEXT NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, date_taken)
);

CREATE TABLE IF NOT EXISTS rewards (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS reward_challenges (
    reward_id TEXT NOT NULL REFERENCES rewards(id) ON DELETE CASCADE,
    id TEXT NOT NULL,
    position INTEGER NOT NULL,
    category TEXT NOT NULL,
    subcategory TEXT NOT NULL,
    restriction TEXT NOT NULL,
    time INTEGER NOT NULL DEFAULT 0,
    amount_to_consume REAL NOT NULL DEFAULT 0,
    PRIMARY KEY (reward_id, id)
);

CREATE TABLE IF NOT EXISTS user_rewards (
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    reward_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    title TEXT NOT NULL,
    status TEXT NOT NULL,
    notification_status TEXT NOT NULL,
    date_completed INTEGER,
    PRIMARY KEY (user_id, reward_id)
);

CREATE TABLE IF NOT EXISTS user_reward_challenges (
    user_id TEXT NOT NULL,
    reward_id TEXT NOT NULL,
    challenge_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    category TEXT NOT NULL,
    subcategory TEXT NOT NULL,
    restriction TEXT NOT NULL,
    time INTEGER NOT NULL DEFAULT 0,
    amount_to_consume REAL NOT NULL DEFAULT 0,
    status TEXT NOT NULL,
    notification_status TEXT NOT NULL,
    date_completed INTEGER,
    progress REAL NOT NULL DEFAULT 0,
    PRIMARY KEY (user_id, reward_id, challenge_id),
    FOREIGN KEY (user_id, reward_id) REFERENCES user_rewards(user_id, reward_id) ON DELETE CASCADE
);
CREATE INDEX IF NOT EXISTS idx_user_challenges_user ON user_reward_challenges(user_id);
"#;
