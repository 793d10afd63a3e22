// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store wrapper with failure injection and call counting.
//!
//! `FaultyStore` forwards to a real [`SqliteStorage`] unless a [`Fault`] is
//! armed for the operation, in which case it returns a storage error without
//! touching the database.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use threadway_core::types::{Conversation, ConversationId, Message, NewMessage, User, UserId};
use threadway_core::{
    AdapterType, ConversationStore, Direction, HealthStatus, IdentityAdapter, PluginAdapter,
    ThreadwayError,
};
use threadway_storage::SqliteStorage;

/// An operation that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    ResolveUser,
    GetOrCreateConversation,
    LoadMessages,
    AppendInbound,
    AppendOutbound,
}

pub struct FaultyStore {
    inner: Arc<SqliteStorage>,
    faults: Mutex<HashSet<Fault>>,
    calls: AtomicUsize,
}

impl FaultyStore {
    pub fn new(inner: Arc<SqliteStorage>) -> Self {
        Self {
            inner,
            faults: Mutex::new(HashSet::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Arm `fault` until [`FaultyStore::heal`] is called.
    pub fn fail(&self, fault: Fault) {
        self.lock().insert(fault);
    }

    pub fn heal(&self, fault: Fault) {
        self.lock().remove(&fault);
    }

    /// Number of identity or store calls received, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &Arc<SqliteStorage> {
        &self.inner
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<Fault>> {
        self.faults.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self, fault: Fault) -> Result<(), ThreadwayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.lock().contains(&fault) {
            return Err(ThreadwayError::storage(format!("injected fault: {fault:?}")));
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for FaultyStore {
    fn name(&self) -> &str {
        "faulty-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ThreadwayError> {
        self.inner.health_check().await
    }

    async fn shutdown(&self) -> Result<(), ThreadwayError> {
        self.inner.shutdown().await
    }
}

#[async_trait]
impl ConversationStore for FaultyStore {
    async fn get_or_create_conversation(
        &self,
        user_id: &UserId,
    ) -> Result<ConversationId, ThreadwayError> {
        self.check(Fault::GetOrCreateConversation)?;
        self.inner.get_or_create_conversation(user_id).await
    }

    async fn append_message(
        &self,
        conversation_id: &ConversationId,
        message: &NewMessage,
    ) -> Result<Message, ThreadwayError> {
        let fault = match message.direction {
            Direction::Inbound => Fault::AppendInbound,
            Direction::Outbound => Fault::AppendOutbound,
        };
        self.check(fault)?;
        self.inner.append_message(conversation_id, message).await
    }

    async fn load_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, ThreadwayError> {
        self.check(Fault::LoadMessages)?;
        self.inner.load_messages(conversation_id).await
    }

    async fn find_conversation(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Conversation>, ThreadwayError> {
        self.inner.find_conversation(user_id).await
    }
}

#[async_trait]
impl IdentityAdapter for FaultyStore {
    async fn get_or_create_user(&self, phone_number: &str) -> Result<User, ThreadwayError> {
        self.check(Fault::ResolveUser)?;
        self.inner.get_or_create_user(phone_number).await
    }
}
