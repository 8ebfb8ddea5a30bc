// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User rows, created lazily on first contact.

use kerb_core::{KerbError, User};
use rusqlite::params;

use crate::database::{Database, map_tr_err};

/// Insert the user row if it does not exist yet. An existing row is left
/// untouched, including its display name.
pub async fn ensure_user(
    db: &Database,
    sender: &str,
    display_name: Option<&str>,
) -> Result<(), KerbError> {
    let sender = sender.to_string();
    let display_name = display_name.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let now = chrono::Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO users (sender, display_name, created_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (sender) DO NOTHING",
                params![sender, display_name, now],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err::<rusqlite::Error>)
}

/// Get a user by sender address.
pub async fn get_user(db: &Database, sender: &str) -> Result<Option<User>, KerbError> {
    let sender = sender.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT sender, display_name, created_at FROM users WHERE sender = ?1",
            )?;
            let result = stmt.query_row(params![sender], |row| {
                Ok(User {
                    sender: row.get(0)?,
                    display_name: row.get(1)?,
                    created_at: row.get(2)?,
                })
            });
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err::<rusqlite::Error>)
}
