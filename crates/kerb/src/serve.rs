// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kerb serve` command implementation.
//!
//! Opens SQLite storage, builds the WhatsApp dispatcher and conversation
//! engine, and serves the webhook until shutdown.

use std::sync::Arc;

use tracing::info;

use kerb_config::model::KerbConfig;
use kerb_core::error::KerbError;
use kerb_core::traits::ReplyDispatcher;
use kerb_engine::ConversationEngine;
use kerb_gateway::{GatewayState, start_server};
use kerb_storage::{Database, SqliteStore};
use kerb_whatsapp::WhatsAppClient;

/// Runs the `kerb serve` command.
pub async fn run_serve(config: KerbConfig) -> Result<(), KerbError> {
    init_tracing(&config.service.log_level);

    info!(service = %config.service.name, "starting kerb serve");

    let db = Database::open(&config.storage.database_path, config.storage.wal_mode).await?;
    let store = Arc::new(SqliteStore::new(db, config.booking.clone()));
    info!(path = %config.storage.database_path, "storage ready");

    let dispatcher: Arc<dyn ReplyDispatcher> = Arc::new(WhatsAppClient::new(&config.whatsapp)?);

    let engine = Arc::new(ConversationEngine::new(
        store.clone(),
        store.clone(),
        dispatcher,
        config.booking.history_limit,
    ));

    let state = GatewayState::new(engine, &config.whatsapp);
    start_server(&config.server, state).await?;

    store.close().await?;
    info!("kerb serve stopped");
    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kerb={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
