//! SQLite persistence — user credentials and transcript snapshots.
//!
//! One database file holds both logical tables: `users` (username + argon2id
//! PHC hash) and `chat_history` (immutable conversation snapshots, JSON-coded
//! turn sequences keyed by owner and timestamp). The connection is shared
//! behind a mutex; SQLite's own atomicity serializes concurrent writers.

use crate::session::types::Turn;
use anyhow::{Context, Result};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Local;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Registration failures, surfaced inline to the user.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Username must be 3-20 characters, using letters, numbers, or underscores.")]
    InvalidUsername,
    #[error("Password must be at least 8 characters, including an uppercase letter and a number.")]
    WeakPassword,
    #[error("Username already exists.")]
    DuplicateUser,
    #[error("credential storage failed: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Snapshot retrieval failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("snapshot not found")]
    NotFound,
    #[error("transcript storage failed: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("corrupt snapshot: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Identifier and creation instant of a stored snapshot, most-recent-first
/// when listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotMeta {
    pub id: String,
    pub timestamp: String,
}

impl SnapshotMeta {
    /// Timestamp truncated to seconds, used as a history label.
    pub fn label(&self) -> &str {
        let end = self
            .timestamp
            .char_indices()
            .nth(19)
            .map_or(self.timestamp.len(), |(idx, _)| idx);
        &self.timestamp[..end]
    }
}

/// Credential and transcript store over a single SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating data directory {}", parent.display()))?;
        }
        let conn = Connection::open(db_path)
            .with_context(|| format!("opening database {}", db_path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("setting SQLite pragmas")?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                username      TEXT PRIMARY KEY,
                password_hash TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS chat_history (
                id        TEXT PRIMARY KEY,
                username  TEXT NOT NULL REFERENCES users(username),
                timestamp TEXT NOT NULL,
                messages  TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_chat_history_username ON chat_history(username);",
        )
        .context("initializing schema")?;
        Ok(())
    }

    // ── Credentials ──────────────────────────────────────────────

    /// Create a new user. Validation precedence: username shape, password
    /// strength, duplicate check (via the primary-key constraint).
    pub fn register(&self, username: &str, password: &str) -> std::result::Result<(), AuthError> {
        if !valid_username(username) {
            return Err(AuthError::InvalidUsername);
        }
        if !valid_password(password) {
            return Err(AuthError::WeakPassword);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hash(e.to_string()))?
            .to_string();

        let conn = self.conn.lock();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO users (username, password_hash) VALUES (?1, ?2)",
            params![username, hash],
        )?;
        if inserted == 0 {
            return Err(AuthError::DuplicateUser);
        }
        Ok(())
    }

    /// True iff the user exists and the password verifies against the stored
    /// hash. Missing-user and wrong-password are indistinguishable here so
    /// the login surface cannot be used to enumerate accounts.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<bool> {
        let stored: Option<String> = {
            let conn = self.conn.lock();
            conn.query_row(
                "SELECT password_hash FROM users WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .optional()?
        };

        let Some(stored) = stored else {
            return Ok(false);
        };

        let parsed = PasswordHash::new(&stored)
            .map_err(|e| anyhow::anyhow!("stored hash for {username} is malformed: {e}"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    // ── Transcripts ──────────────────────────────────────────────

    /// Persist the full turn sequence as a fresh, immutable snapshot.
    /// Returns the new snapshot id.
    pub fn save_snapshot(&self, owner: &str, turns: &[Turn]) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let timestamp = Local::now().to_rfc3339();
        let messages = serde_json::to_string(turns).context("serializing snapshot")?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO chat_history (id, username, timestamp, messages) VALUES (?1, ?2, ?3, ?4)",
            params![id, owner, timestamp, messages],
        )
        .context("saving snapshot")?;
        Ok(id)
    }

    /// All snapshots for `owner`, most recent first.
    pub fn list_snapshots(&self, owner: &str) -> Result<Vec<SnapshotMeta>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, timestamp FROM chat_history WHERE username = ?1 ORDER BY timestamp DESC",
        )?;
        let rows = stmt.query_map(params![owner], |row| {
            Ok(SnapshotMeta {
                id: row.get(0)?,
                timestamp: row.get(1)?,
            })
        })?;

        let mut snapshots = Vec::new();
        for row in rows {
            snapshots.push(row?);
        }
        Ok(snapshots)
    }

    /// Deserialize the stored turn sequence for `id`.
    pub fn load_snapshot(&self, id: &str) -> std::result::Result<Vec<Turn>, StoreError> {
        let messages: Option<String> = {
            let conn = self.conn.lock();
            conn.query_row(
                "SELECT messages FROM chat_history WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?
        };
        let messages = messages.ok_or(StoreError::NotFound)?;
        Ok(serde_json::from_str(&messages)?)
    }
}

/// Username policy: 3-20 chars, ASCII letters, digits, or underscores.
fn valid_username(username: &str) -> bool {
    (3..=20).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Password policy: at least 8 chars with one uppercase letter and one digit.
fn valid_password(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}
