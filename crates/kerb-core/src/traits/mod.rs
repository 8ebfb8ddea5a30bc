// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits decoupling the conversation engine from concrete
//! persistence and messaging implementations.

pub mod booking_repo;
pub mod dispatcher;
pub mod session_store;

pub use booking_repo::BookingRepository;
pub use dispatcher::ReplyDispatcher;
pub use session_store::SessionStore;
