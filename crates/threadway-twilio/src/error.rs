// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Twilio channel.

use thiserror::Error;

/// The request could not be checked against its signature.
///
/// A signature that is present and well formed but wrong is not an error:
/// verification returns `Ok(false)`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing X-Twilio-Signature header")]
    MissingHeader,

    #[error("malformed X-Twilio-Signature header: {0}")]
    MalformedHeader(String),

    #[error("auth token is empty")]
    InvalidKey,
}

/// A webhook body that could not be turned into a [`ValidatedWebhook`](crate::ValidatedWebhook).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed form body: {0}")]
    MalformedBody(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// Neither message content nor a delivery status was present.
    #[error("payload is neither an incoming message nor a status callback")]
    UnknownShape,
}

/// Reply text that cannot be carried in an XML document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("character U+{code:04X} at byte {position} is not allowed in XML")]
    InvalidCharacter { code: u32, position: usize },
}
