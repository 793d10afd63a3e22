// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that every backend implements.

use async_trait::async_trait;

use crate::error::ThreadwayError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for all Threadway adapters.
///
/// Provides identity, health reporting and shutdown for storage, identity
/// and completion backends alike.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the type of adapter.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, ThreadwayError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), ThreadwayError>;
}
