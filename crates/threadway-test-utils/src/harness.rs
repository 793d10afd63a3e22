// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a real orchestrator over a temp SQLite database,
//! a [`MockProvider`] and a [`FaultyStore`]. Provides `send_text()` to drive
//! the full turn in tests.

use std::sync::Arc;

use threadway_agent::{ChatOrchestrator, ChatbotError, ResponseGenerator, TurnOutcome};
use threadway_config::model::StorageConfig;
use threadway_core::types::{Message, MessageKind};
use threadway_core::{ConversationStore, DomainMessage, ThreadwayError};
use threadway_storage::SqliteStorage;

use crate::faulty_store::FaultyStore;
use crate::mock_provider::MockProvider;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    system_prompt: String,
    history_window: Option<usize>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            system_prompt: "You are a test assistant.".to_string(),
            history_window: None,
        }
    }

    /// Set mock provider responses.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_history_window(mut self, limit: usize) -> Self {
        self.history_window = Some(limit);
        self
    }

    /// Build the harness, creating the temp database and all adapters.
    pub async fn build(self) -> Result<TestHarness, ThreadwayError> {
        let temp_dir = tempfile::TempDir::new().map_err(ThreadwayError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        }));
        storage.initialize().await?;

        let store = Arc::new(FaultyStore::new(storage.clone()));
        let provider = Arc::new(MockProvider::with_responses(self.responses));
        let generator = ResponseGenerator::new(provider.clone(), self.system_prompt);
        let orchestrator = ChatOrchestrator::new(store.clone(), store.clone(), generator)
            .with_history_window(self.history_window);

        Ok(TestHarness {
            storage,
            store,
            provider,
            orchestrator,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete turn pipeline backed by a throwaway database.
pub struct TestHarness {
    pub storage: Arc<SqliteStorage>,
    pub store: Arc<FaultyStore>,
    pub provider: Arc<MockProvider>,
    pub orchestrator: ChatOrchestrator,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Run one text turn from `from` (raw channel address).
    pub async fn send_text(&self, from: &str, body: &str) -> Result<TurnOutcome, ChatbotError> {
        self.orchestrator.handle(&inbound_text(from, body)).await
    }

    /// Stored messages for `phone` (E.164), oldest first. Empty if unknown.
    pub async fn messages_for(&self, phone: &str) -> Result<Vec<Message>, ThreadwayError> {
        let db = self.storage.database()?;
        let Some(user) = threadway_storage::queries::users::find_by_phone(db, phone).await? else {
            return Ok(Vec::new());
        };
        match self.storage.find_conversation(&user.id).await? {
            Some(conversation) => self.storage.load_messages(&conversation.id).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn conversation_count(&self) -> Result<i64, ThreadwayError> {
        self.storage.conversation_count().await
    }

    pub async fn message_count(&self) -> Result<i64, ThreadwayError> {
        self.storage.message_count().await
    }
}

/// A normalized text message as the webhook would produce it.
pub fn inbound_text(from: &str, body: &str) -> DomainMessage {
    DomainMessage {
        kind: MessageKind::Text,
        from: from.to_string(),
        to: "whatsapp:+14155238886".to_string(),
        text: Some(body.to_string()),
        media: Vec::new(),
        location: None,
        provider_message_id: Some(format!("SM{}", uuid::Uuid::new_v4().simple())),
        raw: serde_json::Value::Null,
    }
}
