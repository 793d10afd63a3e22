// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the conversation and identity traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use threadway_config::model::StorageConfig;
use threadway_core::types::{Conversation, ConversationId, Message, NewMessage, User, UserId};
use threadway_core::{
    AdapterType, ConversationStore, HealthStatus, IdentityAdapter, PluginAdapter, ThreadwayError,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed conversation repository and identity store.
///
/// The database is opened by [`SqliteStorage::initialize`]; every other
/// call fails with a storage error until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create an uninitialized store for the configured path.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database and apply migrations.
    pub async fn initialize(&self) -> Result<(), ThreadwayError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| ThreadwayError::storage("storage already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    /// The open database handle.
    pub fn database(&self) -> Result<&Database, ThreadwayError> {
        self.db
            .get()
            .ok_or_else(|| ThreadwayError::storage("storage not initialized, call initialize() first"))
    }

    /// Number of stored conversations.
    pub async fn conversation_count(&self) -> Result<i64, ThreadwayError> {
        queries::conversations::count(self.database()?).await
    }

    /// Number of stored messages across all conversations.
    pub async fn message_count(&self) -> Result<i64, ThreadwayError> {
        queries::messages::count(self.database()?).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ThreadwayError> {
        let Ok(db) = self.database() else {
            return Ok(HealthStatus::Unhealthy("storage not initialized".to_string()));
        };
        let probe = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT 1", [], |row| row.get(0))
            })
            .await;
        Ok(match probe {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), ThreadwayError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for SqliteStorage {
    async fn get_or_create_conversation(
        &self,
        user_id: &UserId,
    ) -> Result<ConversationId, ThreadwayError> {
        queries::conversations::get_or_create(self.database()?, user_id).await
    }

    async fn append_message(
        &self,
        conversation_id: &ConversationId,
        message: &NewMessage,
    ) -> Result<Message, ThreadwayError> {
        queries::messages::append(self.database()?, conversation_id, message).await
    }

    async fn load_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, ThreadwayError> {
        queries::messages::load(self.database()?, conversation_id).await
    }

    async fn find_conversation(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Conversation>, ThreadwayError> {
        queries::conversations::find_by_user(self.database()?, user_id).await
    }
}

#[async_trait]
impl IdentityAdapter for SqliteStorage {
    async fn get_or_create_user(&self, phone_number: &str) -> Result<User, ThreadwayError> {
        queries::users::get_or_create(self.database()?, phone_number).await
    }
}
