// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./kerb.toml` > `~/.config/kerb/kerb.toml` >
//! `/etc/kerb/kerb.toml` with environment variable overrides via the
//! `KERB_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::KerbConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/kerb/kerb.toml` (system-wide)
/// 3. `~/.config/kerb/kerb.toml` (user XDG config)
/// 4. `./kerb.toml` (local directory)
/// 5. `KERB_*` environment variables
pub fn load_config() -> Result<KerbConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KerbConfig::default()))
        .merge(Toml::file("/etc/kerb/kerb.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("kerb/kerb.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("kerb.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<KerbConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KerbConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KerbConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KerbConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `KERB_WHATSAPP_ACCESS_TOKEN` must map
/// to `whatsapp.access_token`, not `whatsapp.access.token`.
fn env_provider() -> Env {
    Env::prefixed("KERB_").map(|key| {
        // `key` is the env var name with prefix stripped, in its original
        // (upper)case; lowercase it before matching section prefixes.
        // Example: KERB_WHATSAPP_ACCESS_TOKEN -> "whatsapp_access_token"
        let key_str = key.as_str().to_ascii_lowercase();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("server_", "server.", 1)
            .replacen("whatsapp_", "whatsapp.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("booking_", "booking.", 1);
        mapped.into()
    })
}
