// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory implementation of the persistence traits.
//!
//! Mirrors the SQLite store's observable behavior (lazy creation,
//! last-write-wins saves, newest-first history) without touching disk.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use kerb_core::{
    Booking, BookingDraft, BookingRepository, BookingStatus, KerbError, Session, SessionStore,
    User,
};

/// In-memory session + booking store for tests.
///
/// Booking ids are `TEST` plus a zero-padded counter so tests can assert
/// on deterministic ids.
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, Session>>,
    users: Mutex<HashMap<String, User>>,
    bookings: Mutex<Vec<Booking>>,
    next_booking: AtomicU32,
    fail_writes: AtomicBool,
    fare: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_fare(20)
    }

    pub fn with_fare(fare: i64) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            users: Mutex::new(HashMap::new()),
            bookings: Mutex::new(Vec::new()),
            next_booking: AtomicU32::new(1),
            fail_writes: AtomicBool::new(false),
            fare,
        }
    }

    /// Make every subsequent write fail with a storage error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// All bookings ever created, in insertion order.
    pub async fn all_bookings(&self) -> Vec<Booking> {
        self.bookings.lock().await.clone()
    }

    pub async fn user(&self, sender: &str) -> Option<User> {
        self.users.lock().await.get(sender).cloned()
    }

    fn check_writes(&self) -> Result<(), KerbError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KerbError::Storage {
                source: "memory store set to fail".into(),
            });
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, sender: &str) -> Result<Option<Session>, KerbError> {
        Ok(self.sessions.lock().await.get(sender).cloned())
    }

    async fn create_if_absent(&self, sender: &str) -> Result<Session, KerbError> {
        self.check_writes()?;
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .entry(sender.to_string())
            .or_insert_with(|| Session::fresh(sender, &chrono::Utc::now().to_rfc3339()));
        Ok(session.clone())
    }

    async fn save(&self, session: &Session) -> Result<(), KerbError> {
        self.check_writes()?;
        let mut saved = session.clone();
        saved.updated_at = chrono::Utc::now().to_rfc3339();
        self.sessions
            .lock()
            .await
            .insert(session.sender.clone(), saved);
        Ok(())
    }

    async fn ensure_user(
        &self,
        sender: &str,
        display_name: Option<&str>,
    ) -> Result<(), KerbError> {
        self.check_writes()?;
        self.users
            .lock()
            .await
            .entry(sender.to_string())
            .or_insert_with(|| User {
                sender: sender.to_string(),
                display_name: display_name.map(str::to_string),
                created_at: chrono::Utc::now().to_rfc3339(),
            });
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn create(&self, sender: &str, draft: &BookingDraft) -> Result<Booking, KerbError> {
        self.check_writes()?;
        let n = self.next_booking.fetch_add(1, Ordering::SeqCst);
        let booking = Booking {
            id: format!("TEST{n:04}"),
            sender: sender.to_string(),
            pickup: draft.pickup.clone(),
            drop_off: draft.drop_off.clone(),
            ride_time: draft.ride_time.clone(),
            status: BookingStatus::Pending,
            fare: self.fare,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.bookings.lock().await.push(booking.clone());
        Ok(booking)
    }

    async fn list_recent_by_sender(
        &self,
        sender: &str,
        limit: u32,
    ) -> Result<Vec<Booking>, KerbError> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .iter()
            .rev()
            .filter(|b| b.sender == sender)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
