// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the webhook, status callback and health routes.

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use threadway_twilio::{ChannelReply, StatusCallback, ValidatedWebhook, WebhookForm, twiml};
use tracing::{debug, info, warn};

use crate::rejection::WebhookRejection;
use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" or "degraded".
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    /// Adapter name to its health.
    pub components: BTreeMap<String, String>,
}

/// POST {webhook_path}
///
/// Verifies the signature over the raw body, then parses, normalizes and
/// runs the turn. Turn failures are answered with their apology copy.
pub async fn post_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Result<ChannelReply, WebhookRejection> {
    verify(&state, &headers, &uri, &body)?;

    match ValidatedWebhook::parse(&body)? {
        ValidatedWebhook::Incoming(incoming) => {
            let message = threadway_twilio::normalize(&incoming);
            debug!(
                message_sid = %incoming.message_sid,
                kind = %message.kind,
                media = message.media.len(),
                "inbound message"
            );
            let reply = match state.orchestrator.handle(&message).await {
                Ok(outcome) => twiml::encode(&outcome.reply),
                Err(e) => twiml::encode(e.user_reply()),
            };
            Ok(reply)
        }
        ValidatedWebhook::StatusCallback(status) => {
            log_status(&status);
            Ok(twiml::empty())
        }
    }
}

/// POST {webhook_path}/status
pub async fn post_status(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Result<ChannelReply, WebhookRejection> {
    verify(&state, &headers, &uri, &body)?;
    acknowledge(WebhookForm::from_bytes(&body)?)
}

/// GET {webhook_path}/status
///
/// Same as the POST variant with the fields in the query string. Twilio signs
/// the full URL and an empty body.
pub async fn get_status(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<ChannelReply, WebhookRejection> {
    verify(&state, &headers, &uri, &[])?;
    let query = uri.query().unwrap_or_default();
    acknowledge(WebhookForm::from_bytes(query.as_bytes())?)
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let mut healthy = true;
    let mut components = BTreeMap::new();

    for adapter in &state.health.components {
        let status = match adapter.health_check().await {
            Ok(status) if status.is_healthy() => "healthy".to_string(),
            Ok(status) => {
                healthy = false;
                format!("{status:?}")
            }
            Err(e) => {
                healthy = false;
                format!("error: {e}")
            }
        };
        components.insert(adapter.name().to_string(), status);
    }

    let body = HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        components,
    };
    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(body)).into_response()
}

fn verify(
    state: &GatewayState,
    headers: &HeaderMap,
    uri: &Uri,
    body: &[u8],
) -> Result<(), WebhookRejection> {
    let Some(verifier) = &state.verifier else {
        return Ok(());
    };
    if verifier.verify_request(headers, uri, body)? {
        Ok(())
    } else {
        Err(WebhookRejection::SignatureMismatch)
    }
}

fn acknowledge(form: WebhookForm) -> Result<ChannelReply, WebhookRejection> {
    match ValidatedWebhook::from_form(form) {
        Ok(ValidatedWebhook::StatusCallback(status)) => log_status(&status),
        Ok(ValidatedWebhook::Incoming(incoming)) => {
            warn!(message_sid = %incoming.message_sid, "message posted to status route, ignoring");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(twiml::empty())
}

fn log_status(status: &StatusCallback) {
    info!(
        message_sid = status.message_sid.as_deref().unwrap_or("-"),
        status = %status.message_status,
        error_code = status.error_code.as_deref().unwrap_or("-"),
        "delivery status"
    );
}
