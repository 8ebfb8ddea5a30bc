// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking insert and history queries.

use std::str::FromStr;

use kerb_core::{Booking, BookingStatus, KerbError};
use rusqlite::params;

use crate::database::{Database, map_tr_err};

fn row_to_booking(row: &rusqlite::Row<'_>) -> Result<Booking, rusqlite::Error> {
    let status_raw: String = row.get(5)?;
    let status = BookingStatus::from_str(&status_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Booking {
        id: row.get(0)?,
        sender: row.get(1)?,
        pickup: row.get(2)?,
        drop_off: row.get(3)?,
        ride_time: row.get(4)?,
        status,
        fare: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Insert a booking row. The id column carries no UNIQUE constraint, so a
/// replayed turn with a colliding id still inserts a second row.
pub async fn insert_booking(db: &Database, booking: &Booking) -> Result<(), KerbError> {
    let booking = booking.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO bookings
                     (id, sender, pickup, drop_off, ride_time, status, fare, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    booking.id,
                    booking.sender,
                    booking.pickup,
                    booking.drop_off,
                    booking.ride_time,
                    booking.status.to_string(),
                    booking.fare,
                    booking.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err::<rusqlite::Error>)
}

/// The sender's bookings, newest first, at most `limit` rows.
///
/// rowid breaks ties between rows created within the same timestamp
/// granularity, keeping insertion order stable.
pub async fn list_recent_by_sender(
    db: &Database,
    sender: &str,
    limit: u32,
) -> Result<Vec<Booking>, KerbError> {
    let sender = sender.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sender, pickup, drop_off, ride_time, status, fare, created_at
                 FROM bookings
                 WHERE sender = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![sender, limit], row_to_booking)?;
            let mut bookings = Vec::new();
            for row in rows {
                bookings.push(row?);
            }
            Ok(bookings)
        })
        .await
        .map_err(map_tr_err::<rusqlite::Error>)
}
