// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity collaborator trait.

use async_trait::async_trait;

use crate::error::ThreadwayError;
use crate::traits::adapter::PluginAdapter;
use crate::types::User;

/// Resolves channel addresses to users, creating them lazily.
#[async_trait]
pub trait IdentityAdapter: PluginAdapter {
    /// Returns the user owning `phone_number`, creating it if absent.
    ///
    /// `phone_number` is already normalized to E.164 by the caller.
    async fn get_or_create_user(&self, phone_number: &str) -> Result<User, ThreadwayError>;
}
