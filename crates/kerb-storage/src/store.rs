// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementations of the core persistence traits.

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

use kerb_config::model::BookingConfig;
use kerb_core::{
    Booking, BookingDraft, BookingRepository, BookingStatus, KerbError, Session, SessionStore,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed store implementing both [`SessionStore`] and
/// [`BookingRepository`].
///
/// Wraps an already-open [`Database`] handle and delegates all query
/// operations to the typed query modules. Booking id generation and the
/// fixed fare come from [`BookingConfig`].
pub struct SqliteStore {
    db: Database,
    booking: BookingConfig,
}

impl SqliteStore {
    pub fn new(db: Database, booking: BookingConfig) -> Self {
        Self { db, booking }
    }

    /// Checkpoint and close the underlying database.
    pub async fn close(&self) -> Result<(), KerbError> {
        self.db.close().await
    }

    /// Generate a booking id: configured prefix plus four random digits.
    /// Uniqueness is best-effort; collisions are accepted by the schema.
    fn generate_booking_id(&self) -> String {
        let suffix: u16 = rand::thread_rng().gen_range(1000..10000);
        format!("{}{}", self.booking.id_prefix, suffix)
    }
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn get(&self, sender: &str) -> Result<Option<Session>, KerbError> {
        queries::sessions::get_session(&self.db, sender).await
    }

    async fn create_if_absent(&self, sender: &str) -> Result<Session, KerbError> {
        queries::sessions::create_if_absent(&self.db, sender).await
    }

    async fn save(&self, session: &Session) -> Result<(), KerbError> {
        queries::sessions::save_session(&self.db, session).await
    }

    async fn ensure_user(
        &self,
        sender: &str,
        display_name: Option<&str>,
    ) -> Result<(), KerbError> {
        queries::users::ensure_user(&self.db, sender, display_name).await
    }
}

#[async_trait]
impl BookingRepository for SqliteStore {
    async fn create(&self, sender: &str, draft: &BookingDraft) -> Result<Booking, KerbError> {
        let booking = Booking {
            id: self.generate_booking_id(),
            sender: sender.to_string(),
            pickup: draft.pickup.clone(),
            drop_off: draft.drop_off.clone(),
            ride_time: draft.ride_time.clone(),
            status: BookingStatus::Pending,
            fare: self.booking.fare,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        queries::bookings::insert_booking(&self.db, &booking).await?;
        debug!(id = %booking.id, sender, "booking stored");
        Ok(booking)
    }

    async fn list_recent_by_sender(
        &self,
        sender: &str,
        limit: u32,
    ) -> Result<Vec<Booking>, KerbError> {
        queries::bookings::list_recent_by_sender(&self.db, sender, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kerb_core::Step;
    use tempfile::tempdir;

    async fn setup_store() -> (SqliteStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("store.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (SqliteStore::new(db, BookingConfig::default()), dir)
    }

    fn make_draft() -> BookingDraft {
        BookingDraft {
            pickup: "Airport".into(),
            drop_off: "Station".into(),
            ride_time: "Now".into(),
        }
    }

    #[tokio::test]
    async fn full_session_lifecycle_through_store() {
        let (store, _dir) = setup_store().await;

        store.ensure_user("wa-1", Some("Asha")).await.unwrap();
        let mut session = store.create_if_absent("wa-1").await.unwrap();
        assert_eq!(session.step, Step::Idle);

        session.step = Step::AwaitingDrop;
        session.pickup = Some("Airport".into());
        store.save(&session).await.unwrap();

        let loaded = store.get("wa-1").await.unwrap().unwrap();
        assert_eq!(loaded.step, Step::AwaitingDrop);
        assert_eq!(loaded.pickup.as_deref(), Some("Airport"));
    }

    #[tokio::test]
    async fn create_assigns_id_fare_and_pending_status() {
        let (store, _dir) = setup_store().await;
        let booking = store.create("wa-1", &make_draft()).await.unwrap();

        assert!(booking.id.starts_with("CAB"));
        assert_eq!(booking.id.len(), "CAB".len() + 4);
        assert_eq!(booking.fare, 20);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.pickup, "Airport");

        let listed = store.list_recent_by_sender("wa-1", 5).await.unwrap();
        assert_eq!(listed, vec![booking]);
    }

    #[tokio::test]
    async fn replayed_finalize_creates_two_rows() {
        // Accepted duplication: replays are not deduplicated.
        let (store, _dir) = setup_store().await;
        let draft = make_draft();
        store.create("wa-1", &draft).await.unwrap();
        store.create("wa-1", &draft).await.unwrap();

        let listed = store.list_recent_by_sender("wa-1", 5).await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn custom_prefix_and_fare_are_used() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("custom.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        let store = SqliteStore::new(
            db,
            BookingConfig {
                fare: 35,
                id_prefix: "RIDE".into(),
                history_limit: 5,
            },
        );

        let booking = store.create("wa-1", &make_draft()).await.unwrap();
        assert!(booking.id.starts_with("RIDE"));
        assert_eq!(booking.fare, 35);
    }
}
