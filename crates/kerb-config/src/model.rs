// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Kerb booking bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Kerb configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KerbConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Webhook HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// WhatsApp Cloud API settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Booking dialog settings.
    #[serde(default)]
    pub booking: BookingConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "kerb".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Webhook HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// WhatsApp Cloud API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Cloud API bearer token. `None` disables outbound sends.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Business phone number id used in the send endpoint path.
    #[serde(default)]
    pub phone_number_id: Option<String>,

    /// Token echoed back during the webhook subscription handshake.
    #[serde(default)]
    pub verify_token: Option<String>,

    /// App secret for `X-Hub-Signature-256` verification. `None` skips
    /// signature checks.
    #[serde(default)]
    pub app_secret: Option<String>,

    /// Cloud API base URL. Overridable so tests can point at a mock server.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            phone_number_id: None,
            verify_token: None,
            app_secret: None,
            api_base: default_api_base(),
        }
    }
}

fn default_api_base() -> String {
    "https://graph.facebook.com/v21.0".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("kerb").join("kerb.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("kerb.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Booking dialog configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BookingConfig {
    /// Fixed fare assigned to every booking.
    #[serde(default = "default_fare")]
    pub fare: i64,

    /// Prefix for generated booking ids.
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,

    /// How many bookings the "my bookings" reply lists.
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            fare: default_fare(),
            id_prefix: default_id_prefix(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_fare() -> i64 {
    20
}

fn default_id_prefix() -> String {
    "CAB".to_string()
}

fn default_history_limit() -> u32 {
    5
}
