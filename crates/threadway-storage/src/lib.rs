// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for Threadway.
//!
//! WAL-mode SQLite with embedded migrations. Every statement runs on the
//! single background thread owned by `tokio-rusqlite`, so writes are
//! serialized without an in-process lock.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
