// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared across adapter boundaries.

use thiserror::Error;

/// The error type returned by every adapter trait method.
///
/// Component-specific failures (signature checks, payload parsing, turn
/// orchestration) have their own typed enums in their crates; this one is
/// what storage, identity and completion backends report.
#[derive(Debug, Error)]
pub enum ThreadwayError {
    /// Configuration errors (invalid TOML, missing secrets, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (connection, query failure, constraint violation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Completion provider errors (transport, rate limiting, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Messaging channel errors (binding the webhook listener, serving).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ThreadwayError {
    /// Wraps any error as a storage failure.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }

    /// Builds a provider failure without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }
}
