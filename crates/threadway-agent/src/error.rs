// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed turn failures.

use std::fmt;

use thiserror::Error;
use threadway_core::{Direction, ThreadwayError};

use crate::address::AddressError;
use crate::generator::GenerationError;

/// Generic apology used for every failure the user cannot fix.
pub const APOLOGY: &str =
    "I'm having trouble processing your message right now. Please try again later.";

/// States of one inbound-message turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Validating,
    ResolvingUser,
    LoadingHistory,
    PersistingInbound,
    Generating,
    PersistingOutbound,
    Done,
    Errored,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TurnState::Validating => "validating",
            TurnState::ResolvingUser => "resolving_user",
            TurnState::LoadingHistory => "loading_history",
            TurnState::PersistingInbound => "persisting_inbound",
            TurnState::Generating => "generating",
            TurnState::PersistingOutbound => "persisting_outbound",
            TurnState::Done => "done",
            TurnState::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// A turn that did not produce a reply. One variant per failing transition.
#[derive(Debug, Error)]
pub enum ChatbotError {
    #[error("message has no content")]
    InvalidMessage,

    #[error("invalid sender: {0}")]
    InvalidUserId(#[source] AddressError),

    #[error("failed to resolve user: {0}")]
    UserResolutionFailed(#[source] ThreadwayError),

    #[error("failed to get or create conversation: {0}")]
    ConversationCreationFailed(#[source] ThreadwayError),

    #[error("failed to load conversation history: {0}")]
    ConversationLookupFailed(#[source] ThreadwayError),

    #[error("failed to save {direction} message: {source}")]
    MessageSaveFailed {
        direction: Direction,
        #[source]
        source: ThreadwayError,
    },

    #[error("AI generation failed: {0}")]
    AiGenerationFailed(#[source] GenerationError),
}

impl ChatbotError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ChatbotError::InvalidMessage => "INVALID_MESSAGE",
            ChatbotError::InvalidUserId(_) => "INVALID_USER_ID",
            ChatbotError::UserResolutionFailed(_) => "USER_RESOLUTION_FAILED",
            ChatbotError::ConversationCreationFailed(_) => "CONVERSATION_CREATION_FAILED",
            ChatbotError::ConversationLookupFailed(_) => "CONVERSATION_LOOKUP_FAILED",
            ChatbotError::MessageSaveFailed { .. } => "MESSAGE_SAVE_FAILED",
            ChatbotError::AiGenerationFailed(_) => "AI_GENERATION_FAILED",
        }
    }

    /// The state the turn was in when it failed.
    pub fn state(&self) -> TurnState {
        match self {
            ChatbotError::InvalidMessage | ChatbotError::InvalidUserId(_) => TurnState::Validating,
            ChatbotError::UserResolutionFailed(_) => TurnState::ResolvingUser,
            ChatbotError::ConversationCreationFailed(_)
            | ChatbotError::ConversationLookupFailed(_) => TurnState::LoadingHistory,
            ChatbotError::MessageSaveFailed {
                direction: Direction::Inbound,
                ..
            } => TurnState::PersistingInbound,
            ChatbotError::MessageSaveFailed {
                direction: Direction::Outbound,
                ..
            } => TurnState::PersistingOutbound,
            ChatbotError::AiGenerationFailed(_) => TurnState::Generating,
        }
    }

    /// What to tell the chat participant.
    pub fn user_reply(&self) -> &'static str {
        match self {
            ChatbotError::InvalidMessage => {
                "I didn't catch that. Please send a text message and I'll do my best to help."
            }
            ChatbotError::InvalidUserId(_) => {
                "Sorry, I couldn't recognise the number this message came from."
            }
            _ => APOLOGY,
        }
    }
}
