// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Kerb booking bot.

use thiserror::Error;

/// The primary error type used across adapter traits and core operations.
#[derive(Debug, Error)]
pub enum KerbError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging provider errors (send rejected, connection failure, rate limiting).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Webhook payload could not be decoded (missing or malformed sender/body).
    #[error("decode error: {0}")]
    Decode(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
