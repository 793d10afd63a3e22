// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management: PRAGMA setup, migrations, lifecycle.
//!
//! All writes go through the one `tokio_rusqlite::Connection` held here.
//! Do not open extra connections for writes.

use std::path::Path;

use threadway_core::ThreadwayError;
use tracing::debug;

use crate::migrations;

/// Handle to the SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` in WAL mode and run
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, ThreadwayError> {
        Self::open_with(path, true).await
    }

    /// Open the database, choosing whether to switch the journal to WAL.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, ThreadwayError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(ThreadwayError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(ThreadwayError::storage)?;

        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                    row.get::<_, String>(0)
                })?;
            }
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.busy_timeout(std::time::Duration::from_secs(5))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(|e: tokio_rusqlite::Error<refinery::Error>| {
                ThreadwayError::storage(format!("migration failed: {e}"))
            })?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL into the main file so a copy of the `.db` alone is complete.
    pub async fn checkpoint(&self) -> Result<(), ThreadwayError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
            })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoint and close the connection.
    pub async fn close(self) -> Result<(), ThreadwayError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(ThreadwayError::storage)
    }
}

/// Convert a `tokio_rusqlite` error into a storage error.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ThreadwayError {
    ThreadwayError::storage(e)
}

/// Current time as an RFC 3339 UTC string with millisecond precision.
///
/// Fixed width, so lexicographic order matches chronological order.
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}
