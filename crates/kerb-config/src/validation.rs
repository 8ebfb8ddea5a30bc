// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses and a usable history limit.

use crate::diagnostic::ConfigError;
use crate::model::KerbConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &KerbConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate host is not empty and looks like an IP or hostname
    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    // Validate database_path is not empty
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Validate booking settings
    if config.booking.fare < 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "booking.fare must be non-negative, got {}",
                config.booking.fare
            ),
        });
    }

    if config.booking.id_prefix.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "booking.id_prefix must not be empty".to_string(),
        });
    }

    if config.booking.history_limit < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "booking.history_limit must be at least 1, got {}",
                config.booking.history_limit
            ),
        });
    }

    // A webhook signature check without a verify token is almost always a
    // half-configured deployment; flag it.
    if config.whatsapp.app_secret.is_some() && config.whatsapp.verify_token.is_none() {
        errors.push(ConfigError::Validation {
            message: "whatsapp.app_secret is set but whatsapp.verify_token is not".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
