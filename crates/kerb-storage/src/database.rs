// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All access is serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use kerb_core::KerbError;
use tracing::debug;

use crate::migrations;

/// Shared handle to the process-wide SQLite connection.
///
/// Opened once at startup and reused for every request; there is no
/// per-request teardown.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if necessary) the database at `path`, apply PRAGMAs,
    /// and run pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, KerbError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| KerbError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| map_tr_err(tokio_rusqlite::Error::from(e)))?;

        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn.pragma_update(None, "synchronous", "NORMAL")?;
            }
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err::<rusqlite::Error>)?;

        conn.call(migrations::run_migrations)
            .await
            .map_err(map_tr_err::<refinery::Error>)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection for query modules.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(&self) -> Result<(), KerbError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err::<rusqlite::Error>)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub fn map_tr_err<E>(e: tokio_rusqlite::Error<E>) -> KerbError
where
    E: std::error::Error + Send + Sync + 'static,
{
    KerbError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_parent_dirs() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/dir/kerb.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        assert!(db_path.exists(), "database file should be created");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn migrations_create_expected_tables() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("tables.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
                let mut names = Vec::new();
                for row in rows {
                    names.push(row?);
                }
                Ok::<_, rusqlite::Error>(names)
            })
            .await
            .unwrap();

        for expected in ["users", "sessions", "bookings"] {
            assert!(
                tables.iter().any(|t| t == expected),
                "missing table {expected}, got {tables:?}"
            );
        }
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");
        {
            let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
            db.close().await.unwrap();
        }
        // Second open re-runs the migration runner, which must be a no-op.
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        db.close().await.unwrap();
    }
}
