// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-message turn.
//!
//! `Validating -> ResolvingUser -> LoadingHistory -> PersistingInbound ->
//! Generating -> PersistingOutbound -> Done`. Any step before
//! `PersistingOutbound` can abort the turn with a [`ChatbotError`]; a failed
//! outbound save is logged and the reply is still returned.

use std::sync::Arc;

use threadway_core::types::NewMessage;
use threadway_core::{
    ConversationId, ConversationStore, Direction, DomainMessage, IdentityAdapter,
};
use tracing::{debug, info, warn};

use crate::address::{mask_phone, normalize_address};
use crate::compose::compose_user_text;
use crate::error::{ChatbotError, TurnState};
use crate::generator::ResponseGenerator;
use crate::history;

/// Result of a turn that produced a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Assistant text to send back.
    pub reply: String,
    pub conversation_id: ConversationId,
    pub inbound_message_id: String,
    /// False when the reply could not be stored.
    pub outbound_persisted: bool,
}

/// Drives one inbound message through resolution, persistence and generation.
///
/// Holds no per-request state; everything is re-read from the store on each
/// call, so one instance is shared by all webhook tasks.
#[derive(Clone)]
pub struct ChatOrchestrator {
    identity: Arc<dyn IdentityAdapter>,
    store: Arc<dyn ConversationStore>,
    generator: ResponseGenerator,
    max_history: Option<usize>,
}

impl ChatOrchestrator {
    pub fn new(
        identity: Arc<dyn IdentityAdapter>,
        store: Arc<dyn ConversationStore>,
        generator: ResponseGenerator,
    ) -> Self {
        Self {
            identity,
            store,
            generator,
            max_history: None,
        }
    }

    /// Only feed the last `limit` turns of history to the model.
    pub fn with_history_window(mut self, limit: Option<usize>) -> Self {
        self.max_history = limit;
        self
    }

    pub async fn handle(&self, message: &DomainMessage) -> Result<TurnOutcome, ChatbotError> {
        let result = self.run(message).await;
        if let Err(e) = &result {
            warn!(
                code = e.code(),
                state = %e.state(),
                error = %e,
                "turn aborted"
            );
            debug!(from = %e.state(), to = %TurnState::Errored, "turn transition");
        }
        result
    }

    async fn run(&self, message: &DomainMessage) -> Result<TurnOutcome, ChatbotError> {
        // Validating
        let user_text = compose_user_text(message);
        if user_text.is_empty() {
            return Err(ChatbotError::InvalidMessage);
        }
        let phone = normalize_address(&message.from).map_err(ChatbotError::InvalidUserId)?;
        let masked = mask_phone(&phone);
        transition(TurnState::Validating, TurnState::ResolvingUser, &masked);

        // ResolvingUser
        let user = self
            .identity
            .get_or_create_user(&phone)
            .await
            .map_err(ChatbotError::UserResolutionFailed)?;
        transition(TurnState::ResolvingUser, TurnState::LoadingHistory, &masked);

        // LoadingHistory
        let conversation_id = self
            .store
            .get_or_create_conversation(&user.id)
            .await
            .map_err(ChatbotError::ConversationCreationFailed)?;
        let stored = self
            .store
            .load_messages(&conversation_id)
            .await
            .map_err(ChatbotError::ConversationLookupFailed)?;
        let turns = history::window(history::assemble(&stored), self.max_history);
        debug!(
            conversation_id = %conversation_id,
            stored = stored.len(),
            turns = turns.len(),
            "history loaded"
        );
        transition(TurnState::LoadingHistory, TurnState::PersistingInbound, &masked);

        // PersistingInbound
        let first_media = message.media.first();
        let inbound = NewMessage {
            id: message.provider_message_id.clone(),
            content: user_text.clone(),
            direction: Direction::Inbound,
            message_type: message.kind,
            media_url: first_media.map(|m| m.url.clone()),
            media_type: first_media.map(|m| m.content_type.clone()),
            provider_sid: message.provider_message_id.clone(),
        };
        let inbound = self
            .store
            .append_message(&conversation_id, &inbound)
            .await
            .map_err(|source| ChatbotError::MessageSaveFailed {
                direction: Direction::Inbound,
                source,
            })?;
        transition(TurnState::PersistingInbound, TurnState::Generating, &masked);

        // Generating
        let reply = self
            .generator
            .generate(turns, &user_text)
            .await
            .map_err(ChatbotError::AiGenerationFailed)?;
        transition(TurnState::Generating, TurnState::PersistingOutbound, &masked);

        // PersistingOutbound
        let outbound = NewMessage::text(Direction::Outbound, reply.clone());
        let outbound_persisted = match self.store.append_message(&conversation_id, &outbound).await
        {
            Ok(_) => true,
            Err(e) => {
                let e = ChatbotError::MessageSaveFailed {
                    direction: Direction::Outbound,
                    source: e,
                };
                warn!(
                    code = e.code(),
                    conversation_id = %conversation_id,
                    error = %e,
                    "reply not stored, sending anyway"
                );
                false
            }
        };
        transition(TurnState::PersistingOutbound, TurnState::Done, &masked);

        info!(
            user = %masked,
            conversation_id = %conversation_id,
            kind = %message.kind,
            reply_len = reply.len(),
            "turn complete"
        );

        Ok(TurnOutcome {
            reply,
            conversation_id,
            inbound_message_id: inbound.id,
            outbound_persisted,
        })
    }
}

fn transition(from: TurnState, to: TurnState, user: &str) {
    debug!(%from, %to, user, "turn transition");
}
