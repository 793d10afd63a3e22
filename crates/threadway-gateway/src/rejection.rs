// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Requests refused before they reach the orchestrator.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use threadway_twilio::{ParseError, SignatureError};

#[derive(Debug, Error)]
pub enum WebhookRejection {
    #[error("signature check failed: {0}")]
    Signature(#[from] SignatureError),

    #[error("signature does not match request")]
    SignatureMismatch,

    #[error("malformed webhook: {0}")]
    Parse(#[from] ParseError),
}

impl WebhookRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookRejection::Signature(_) | WebhookRejection::SignatureMismatch => {
                StatusCode::UNAUTHORIZED
            }
            WebhookRejection::Parse(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for WebhookRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(status = status.as_u16(), error = %self, "webhook rejected");
        match self {
            // Nothing about the check is revealed to the caller.
            WebhookRejection::Signature(_) | WebhookRejection::SignatureMismatch => {
                status.into_response()
            }
            WebhookRejection::Parse(e) => (status, e.to_string()).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_failures_are_unauthorized() {
        assert_eq!(
            WebhookRejection::from(SignatureError::MissingHeader).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(WebhookRejection::SignatureMismatch.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn parse_failures_are_bad_request() {
        let rejection = WebhookRejection::from(ParseError::UnknownShape);
        assert_eq!(rejection.status(), StatusCode::BAD_REQUEST);
        assert_eq!(rejection.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
