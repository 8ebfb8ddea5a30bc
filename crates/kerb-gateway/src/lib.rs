// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server for the Kerb booking bot.
//!
//! Exposes the provider-facing webhook surface (message deliveries plus
//! the subscription handshake) and a liveness probe, and runs each
//! decoded delivery through the conversation engine.

pub mod handlers;
pub mod server;

pub use server::{GatewayState, build_router, start_server};
