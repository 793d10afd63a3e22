// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio WhatsApp channel plumbing.
//!
//! Everything between the raw HTTP request Twilio sends and the
//! provider-agnostic [`DomainMessage`](threadway_core::DomainMessage), plus
//! the TwiML envelope sent back:
//!
//! - [`signature`]: `X-Twilio-Signature` verification.
//! - [`webhook`]: form body decoding and shape classification.
//! - [`normalize`]: `IncomingMessage` to `DomainMessage`.
//! - [`twiml`]: reply envelopes.

pub mod error;
pub mod normalize;
pub mod signature;
pub mod twiml;
pub mod webhook;

pub use error::{EncodeError, ParseError, SignatureError};
pub use normalize::normalize;
pub use signature::SignatureVerifier;
pub use twiml::ChannelReply;
pub use webhook::{IncomingMessage, StatusCallback, ValidatedWebhook, WebhookForm};

use threadway_core::ThreadwayError;

/// Environment variable consulted when `twilio.auth_token` is unset.
pub const AUTH_TOKEN_ENV: &str = "TWILIO_AUTH_TOKEN";

/// Resolve the auth token used to verify webhook signatures.
///
/// Order: config, then `TWILIO_AUTH_TOKEN`, then error.
pub fn resolve_auth_token(config_token: Option<&str>) -> Result<String, ThreadwayError> {
    if let Some(token) = config_token
        && !token.is_empty()
    {
        return Ok(token.to_string());
    }

    std::env::var(AUTH_TOKEN_ENV)
        .ok()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ThreadwayError::Config(format!(
                "Twilio auth token not found. Set twilio.auth_token in config or {AUTH_TOKEN_ENV}, \
                 or disable twilio.validate_signatures."
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_auth_token_prefers_config() {
        assert_eq!(resolve_auth_token(Some("tok")).unwrap(), "tok");
    }

    #[test]
    fn resolve_auth_token_empty_config_falls_back_to_env() {
        match resolve_auth_token(Some("")) {
            Ok(token) => assert!(!token.is_empty()),
            Err(e) => assert!(e.to_string().contains("auth token not found")),
        }
    }
}
