// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking persistence contract.

use async_trait::async_trait;

use crate::error::KerbError;
use crate::types::{Booking, BookingDraft};

/// Append-only store of completed bookings.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Generate an id, assign the configured fare, default status to
    /// pending, persist, and return the stored record.
    ///
    /// Id uniqueness is best-effort; replayed turns produce a second row.
    async fn create(&self, sender: &str, draft: &BookingDraft) -> Result<Booking, KerbError>;

    /// The sender's bookings, newest first, at most `limit` rows.
    async fn list_recent_by_sender(
        &self,
        sender: &str,
        limit: u32,
    ) -> Result<Vec<Booking>, KerbError>;
}
