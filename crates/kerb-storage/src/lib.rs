// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Kerb booking bot.
//!
//! A single tokio-rusqlite connection per process, WAL mode, embedded
//! refinery migrations, and typed query modules per table.

pub mod database;
pub mod migrations;
pub mod queries;
pub mod store;

pub use database::Database;
pub use store::SqliteStore;
