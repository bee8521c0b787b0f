/// Submission storage
///
/// `SubmissionStore` wraps the SQLite database that keeps every contact form
/// submission. A stored submission is the durability point: once a row
/// exists, the request is considered accepted regardless of what the email
/// relay does afterwards.
///
/// `rusqlite::Connection` is not Send, so async callers open a fresh store
/// inside `spawn_blocking` instead of sharing one connection.

use super::submission::ContactSubmission;
use chrono::Utc;
use rusqlite::{Connection, Result as SqlResult};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A submission as read back from the database.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredSubmission {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub service: String,
    pub event_date: Option<String>,
    pub message: String,
    /// Unix timestamp of when the submission was stored
    pub created_at: i64,
}

pub struct SubmissionStore {
    conn: Connection,
}

impl SubmissionStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: &Path) -> SqlResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .expect("Failed to create application data directory");
        }
        let conn = Connection::open(path)?;
        let store = SubmissionStore { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> SqlResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = SubmissionStore { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Default database location in the user's data directory:
    /// - Linux: ~/.local/share/nest-portfolio/portfolio.db
    /// - macOS: ~/Library/Application Support/nest-portfolio/portfolio.db
    pub fn default_db_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .expect("Could not determine user data directory");
        path.push("nest-portfolio");
        path.push("portfolio.db");
        path
    }

    /// Create the tables and indexes if they don't exist. Safe to run on
    /// every open.
    fn init_schema(&self) -> SqlResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS contact_submissions (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name      TEXT NOT NULL,
                last_name       TEXT NOT NULL,
                email           TEXT NOT NULL,
                phone           TEXT,
                service         TEXT NOT NULL,
                event_date      TEXT,
                message         TEXT NOT NULL,
                created_at      INTEGER NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_submissions_created_at
             ON contact_submissions(created_at DESC)",
            [],
        )?;

        Ok(())
    }

    /// Store a validated submission. Returns the assigned id.
    pub fn insert(&self, submission: &ContactSubmission) -> SqlResult<i64> {
        self.conn.execute(
            "INSERT INTO contact_submissions
                (first_name, last_name, email, phone, service, event_date, message, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                submission.first_name,
                submission.last_name,
                submission.email,
                submission.phone,
                submission.service,
                submission.event_date,
                submission.message,
                Utc::now().timestamp(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All stored submissions, newest first.
    pub fn list_all(&self) -> SqlResult<Vec<StoredSubmission>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, first_name, last_name, email, phone, service, event_date, message, created_at
             FROM contact_submissions
             ORDER BY created_at DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(StoredSubmission {
                id: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                email: row.get(3)?,
                phone: row.get(4)?,
                service: row.get(5)?,
                event_date: row.get(6)?,
                message: row.get(7)?,
                created_at: row.get(8)?,
            })
        })?;

        let mut submissions = Vec::new();
        for row in rows {
            submissions.push(row?);
        }
        Ok(submissions)
    }

    /// Count of stored submissions (startup log line).
    pub fn submission_count(&self) -> SqlResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM contact_submissions", [], |row| {
                row.get(0)
            })
    }
}

impl std::fmt::Debug for SubmissionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionStore").finish_non_exhaustive()
    }
}
