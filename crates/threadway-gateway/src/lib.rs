// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Threadway.
//!
//! Receives Twilio WhatsApp webhooks, runs each inbound message through the
//! [`ChatOrchestrator`](threadway_agent::ChatOrchestrator) and answers with
//! TwiML. Signature and payload failures map to 401 and 400; every turn
//! failure still gets a 200 with an apology envelope.

pub mod handlers;
pub mod rejection;
pub mod server;

pub use rejection::WebhookRejection;
pub use server::{GatewayState, HealthState, ServerConfig, build_router, start_server};
