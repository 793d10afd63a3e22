// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation repository trait.

use async_trait::async_trait;

use crate::error::ThreadwayError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Conversation, ConversationId, Message, NewMessage, UserId};

/// Durable conversation state: one conversation per user, each with an
/// append-only, creation-ordered message log.
#[async_trait]
pub trait ConversationStore: PluginAdapter {
    /// Returns the user's conversation, creating it on first contact.
    ///
    /// Must be safe under concurrent first contact: any number of callers for
    /// the same user observe the same id and exactly one row is created.
    async fn get_or_create_conversation(
        &self,
        user_id: &UserId,
    ) -> Result<ConversationId, ThreadwayError>;

    /// Appends a message and bumps the conversation's counters atomically.
    ///
    /// Either the row is inserted and `message_count`/`last_message_at` are
    /// updated, or nothing changes.
    async fn append_message(
        &self,
        conversation_id: &ConversationId,
        message: &NewMessage,
    ) -> Result<Message, ThreadwayError>;

    /// Loads a conversation's messages in ascending creation order.
    ///
    /// A fresh conversation yields an empty vector.
    async fn load_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, ThreadwayError>;

    /// Looks up a user's conversation without creating it.
    async fn find_conversation(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Conversation>, ThreadwayError>;
}
