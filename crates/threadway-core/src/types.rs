// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types used across adapter traits and the turn pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of a user, owned by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier of the single conversation a user has.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

impl HealthStatus {
    /// Returns true only for [`HealthStatus::Healthy`].
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
    Identity,
}

// --- Inbound message model ---

/// Classification of a normalized inbound message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Audio,
    Video,
    Document,
    Location,
}

/// A media item attached to an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub url: String,
    pub content_type: String,
}

/// A shared location attached to an inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationAttachment {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
}

/// Provider-agnostic view of one inbound webhook event.
///
/// Never persisted as-is; the orchestrator derives the stored message row
/// from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainMessage {
    pub kind: MessageKind,
    /// Sender channel address exactly as the provider sent it (e.g. `whatsapp:+15551234567`).
    pub from: String,
    /// Recipient channel address.
    pub to: String,
    pub text: Option<String>,
    pub media: Vec<MediaAttachment>,
    pub location: Option<LocationAttachment>,
    /// Provider-assigned message id, when the provider sent one.
    pub provider_message_id: Option<String>,
    /// Raw provider payload, kept for diagnostics only.
    pub raw: serde_json::Value,
}

// --- Conversation model ---

/// Direction of a persisted message relative to the assistant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Sent by the user to the assistant.
    Inbound,
    /// Sent by the assistant to the user.
    Outbound,
}

impl Direction {
    /// The model role a message with this direction plays in a prompt.
    pub fn role(self) -> Role {
        match self {
            Direction::Inbound => Role::User,
            Direction::Outbound => Role::Assistant,
        }
    }
}

/// Role of a turn in a model prompt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One prompt turn fed to, or produced by, the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMessage {
    pub role: Role,
    pub content: String,
}

impl ModelMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A user known to the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Normalized E.164 phone number.
    pub phone_number: String,
    pub name: String,
    pub created_at: String,
}

/// The single persistent thread of messages for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub is_active: bool,
    pub message_count: i64,
    pub last_message_at: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A persisted, append-only message row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub conversation_id: ConversationId,
    pub content: String,
    pub direction: Direction,
    pub message_type: MessageKind,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
    pub provider_sid: Option<String>,
    pub created_at: String,
}

/// A message about to be appended; the store assigns the timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    /// Row id to use. `None` (or an id already taken) falls back to a generated one.
    pub id: Option<String>,
    pub content: String,
    pub direction: Direction,
    pub message_type: MessageKind,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
    pub provider_sid: Option<String>,
}

impl NewMessage {
    /// A plain text message with no provider metadata.
    pub fn text(direction: Direction, content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
            direction,
            message_type: MessageKind::Text,
            media_url: None,
            media_type: None,
            provider_sid: None,
        }
    }
}

// --- Completion model ---

/// A request to the completion service.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model override; `None` uses the provider's configured default.
    pub model: Option<String>,
    /// Fixed system instruction establishing persona and scope.
    pub system_prompt: String,
    /// Prior turns followed by the new user turn, oldest first.
    pub messages: Vec<ModelMessage>,
    pub max_tokens: Option<u32>,
}

/// Token usage reported by the completion service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A completed response from the completion service.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub id: String,
    pub content: String,
    pub model: String,
    pub finish_reason: Option<String>,
    pub usage: TokenUsage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn direction_maps_to_role() {
        assert_eq!(Direction::Inbound.role(), Role::User);
        assert_eq!(Direction::Outbound.role(), Role::Assistant);
    }

    #[test]
    fn message_kind_uses_lowercase_names() {
        assert_eq!(MessageKind::Document.to_string(), "document");
        assert_eq!(MessageKind::from_str("location").unwrap(), MessageKind::Location);
        assert!(MessageKind::from_str("sticker").is_err());
    }

    #[test]
    fn direction_parses_stored_values() {
        assert_eq!(Direction::from_str("inbound").unwrap(), Direction::Inbound);
        assert_eq!(Direction::Outbound.to_string(), "outbound");
    }

    #[test]
    fn model_message_serializes_role_lowercase() {
        let json = serde_json::to_string(&ModelMessage::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn ids_display_inner_value() {
        assert_eq!(ConversationId("c-1".into()).to_string(), "c-1");
        assert_eq!(UserId("u-1".into()).to_string(), "u-1");
    }
}
