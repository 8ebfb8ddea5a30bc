// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session CRUD operations.

use std::str::FromStr;

use kerb_core::{KerbError, Session, Step};
use rusqlite::params;

use crate::database::{Database, map_tr_err};

fn row_to_session(row: &rusqlite::Row<'_>) -> Result<Session, rusqlite::Error> {
    let step_raw: String = row.get(1)?;
    let step = Step::from_str(&step_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Session {
        sender: row.get(0)?,
        step,
        pickup: row.get(2)?,
        drop_off: row.get(3)?,
        ride_time: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

const SESSION_COLUMNS: &str = "sender, step, pickup, drop_off, ride_time, created_at, updated_at";

/// Get a session by sender address.
pub async fn get_session(db: &Database, sender: &str) -> Result<Option<Session>, KerbError> {
    let sender = sender.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions WHERE sender = ?1"
            ))?;
            let result = stmt.query_row(params![sender], row_to_session);
            match result {
                Ok(session) => Ok(Some(session)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err::<rusqlite::Error>)
}

/// Get the session for a sender, inserting a fresh idle one if absent.
pub async fn create_if_absent(db: &Database, sender: &str) -> Result<Session, KerbError> {
    let sender = sender.to_string();
    db.connection()
        .call(move |conn| {
            let now = chrono::Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO sessions (sender, step, created_at, updated_at)
                 VALUES (?1, 'idle', ?2, ?2)
                 ON CONFLICT (sender) DO NOTHING",
                params![sender, now],
            )?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions WHERE sender = ?1"
            ))?;
            Ok(stmt.query_row(params![sender], row_to_session)?)
        })
        .await
        .map_err(map_tr_err::<rusqlite::Error>)
}

/// Persist a session's step and draft in one statement (last write wins).
pub async fn save_session(db: &Database, session: &Session) -> Result<(), KerbError> {
    let session = session.clone();
    db.connection()
        .call(move |conn| {
            let now = chrono::Utc::now().to_rfc3339();
            conn.execute(
                "UPDATE sessions
                 SET step = ?2, pickup = ?3, drop_off = ?4, ride_time = ?5, updated_at = ?6
                 WHERE sender = ?1",
                params![
                    session.sender,
                    session.step.to_string(),
                    session.pickup,
                    session.drop_off,
                    session.ride_time,
                    now,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err::<rusqlite::Error>)
}
