// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core definitions for the Kerb cab-booking bot.
//!
//! This crate holds the types shared across the workspace: the conversation
//! step enum, session/booking/user records, the decoded inbound turn, the
//! reply plan, the [`KerbError`] taxonomy, and the adapter traits that
//! decouple the conversation engine from any concrete store or messaging
//! provider.

pub mod error;
pub mod traits;
pub mod types;

pub use error::KerbError;
pub use traits::{BookingRepository, ReplyDispatcher, SessionStore};
pub use types::{
    Booking, BookingDraft, BookingStatus, InboundTurn, MessageId, Reply, ReplyChoice, Session,
    Step, User,
};
