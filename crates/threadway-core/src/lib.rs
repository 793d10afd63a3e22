// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Threadway.
//!
//! This crate provides the error type, the provider-agnostic domain types and
//! the adapter traits shared by every other crate in the workspace. Storage,
//! identity and completion backends implement the traits defined here; the
//! agent crate only ever talks to them through these seams.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ThreadwayError;
pub use types::{
    AdapterType, ConversationId, Direction, DomainMessage, HealthStatus, MessageKind, ModelMessage,
    Role, UserId,
};

pub use traits::{ConversationStore, IdentityAdapter, PluginAdapter, ProviderAdapter};
