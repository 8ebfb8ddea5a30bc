// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Kerb integration tests.
//!
//! Provides a mock dispatcher with captured sends and an in-memory store
//! implementing the persistence traits, for deterministic engine and
//! gateway tests.

pub mod memory_store;
pub mod mock_dispatcher;

pub use memory_store::MemoryStore;
pub use mock_dispatcher::{MockDispatcher, SentReply};
