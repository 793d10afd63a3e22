// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Threadway integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock completion provider with queued responses and failure injection
//! - [`FaultyStore`] - Store wrapper that fails chosen operations and counts calls
//! - [`TestHarness`] - Temp SQLite database wired into a real orchestrator

pub mod faulty_store;
pub mod harness;
pub mod mock_provider;

pub use faulty_store::{Fault, FaultyStore};
pub use harness::{TestHarness, inbound_text};
pub use mock_provider::MockProvider;
