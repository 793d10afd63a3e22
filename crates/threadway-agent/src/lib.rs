// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestration for Threadway.
//!
//! Turns one normalized inbound message into one assistant reply: resolve
//! the sender, load the conversation, record the message, ask the model,
//! record the reply. Storage, identity and the model are reached only
//! through the adapter traits in `threadway-core`.

pub mod address;
pub mod compose;
pub mod error;
pub mod generator;
pub mod history;
pub mod orchestrator;
pub mod shutdown;

pub use error::{ChatbotError, TurnState};
pub use generator::{GenerationError, ResponseGenerator};
pub use orchestrator::{ChatOrchestrator, TurnOutcome};
