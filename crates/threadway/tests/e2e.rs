// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete webhook-to-reply pipeline.
//!
//! Each test creates an isolated TestHarness with temp SQLite and a mock
//! provider, feeds it raw Twilio form bodies and checks the TwiML and the
//! stored conversation. Tests are independent and order-insensitive.

use std::sync::Arc;

use threadway_core::types::MessageKind;
use threadway_core::{ConversationStore, Direction, IdentityAdapter};
use threadway_test_utils::{Fault, TestHarness};
use threadway_twilio::{ValidatedWebhook, normalize, twiml};

/// Parse, normalize, run and encode one raw webhook body.
async fn deliver(harness: &TestHarness, body: &str) -> String {
    let ValidatedWebhook::Incoming(incoming) = ValidatedWebhook::parse(body.as_bytes()).unwrap()
    else {
        panic!("expected an incoming message");
    };
    let message = normalize(&incoming);
    let reply = match harness.orchestrator.handle(&message).await {
        Ok(outcome) => twiml::encode(&outcome.reply),
        Err(e) => twiml::encode(e.user_reply()),
    };
    reply.body
}

fn text_body(sid: &str, text: &str) -> String {
    format!(
        "MessageSid={sid}&AccountSid=AC1&From=whatsapp%3A%2B15551234567\
         &To=whatsapp%3A%2B14155238886&Body={text}&NumMedia=0"
    )
}

// ---- Message-to-reply pipeline ----

#[tokio::test]
async fn greeting_on_new_number() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec!["Hi! I'm your assistant.".into()])
        .build()
        .await
        .unwrap();

    let body = deliver(&harness, &text_body("SM1", "Hi")).await;
    assert!(body.contains("<Message>Hi! I&apos;m your assistant.</Message>"));

    assert_eq!(harness.conversation_count().await.unwrap(), 1);
    let stored = harness.messages_for("+15551234567").await.unwrap();
    let summary: Vec<_> = stored
        .iter()
        .map(|m| (m.direction, m.content.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Direction::Inbound, "Hi"),
            (Direction::Outbound, "Hi! I'm your assistant."),
        ]
    );
}

#[tokio::test]
async fn messages_load_in_append_order() {
    let harness = TestHarness::builder().build().await.unwrap();

    for (i, text) in ["one", "two", "three", "four"].iter().enumerate() {
        deliver(&harness, &text_body(&format!("SM{i}"), text)).await;
    }

    let stored = harness.messages_for("+15551234567").await.unwrap();
    assert_eq!(stored.len(), 8);
    let inbound: Vec<_> = stored
        .iter()
        .filter(|m| m.direction == Direction::Inbound)
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(inbound, ["one", "two", "three", "four"]);
    assert!(stored.windows(2).all(|w| w[0].created_at <= w[1].created_at));
}

#[tokio::test]
async fn redelivered_sid_does_not_collide() {
    let harness = TestHarness::builder().build().await.unwrap();

    deliver(&harness, &text_body("SMdup", "first")).await;
    deliver(&harness, &text_body("SMdup", "again")).await;

    let stored = harness.messages_for("+15551234567").await.unwrap();
    let inbound: Vec<_> = stored
        .iter()
        .filter(|m| m.direction == Direction::Inbound)
        .collect();
    assert_eq!(inbound.len(), 2);
    assert_eq!(inbound[0].id, "SMdup");
    assert_ne!(inbound[1].id, "SMdup");
    assert_eq!(inbound[1].provider_sid.as_deref(), Some("SMdup"));
}

// ---- Classification ----

#[tokio::test]
async fn location_wins_over_body() {
    let harness = TestHarness::builder().build().await.unwrap();

    let body = "MessageSid=SMloc&AccountSid=AC1&From=whatsapp%3A%2B15551234567\
                &Body=I%27m+here&Latitude=51.5074&Longitude=-0.1278&Address=London";
    deliver(&harness, body).await;

    let stored = harness.messages_for("+15551234567").await.unwrap();
    assert_eq!(stored[0].message_type, MessageKind::Location);
    assert_eq!(
        stored[0].content,
        "I'm here\n[Shared location: 51.5074, -0.1278 (London)]"
    );
}

#[tokio::test]
async fn media_content_types_bucket_into_kinds() {
    let cases = [
        ("image/png", MessageKind::Image),
        ("audio/ogg", MessageKind::Audio),
        ("application/pdf", MessageKind::Document),
    ];

    for (content_type, expected) in cases {
        let harness = TestHarness::builder().build().await.unwrap();
        let body = format!(
            "MessageSid=SMm&AccountSid=AC1&From=whatsapp%3A%2B15551234567&Body=\
             &NumMedia=1&MediaUrl0=https%3A%2F%2Fapi.twilio.com%2Fm%2F1\
             &MediaContentType0={}",
            content_type.replace('/', "%2F")
        );
        deliver(&harness, &body).await;

        let stored = harness.messages_for("+15551234567").await.unwrap();
        assert_eq!(stored[0].message_type, expected, "{content_type}");
        assert_eq!(stored[0].media_type.as_deref(), Some(content_type));
    }
}

// ---- Failure handling ----

#[tokio::test]
async fn empty_body_without_media_writes_nothing() {
    let harness = TestHarness::builder().build().await.unwrap();

    let body = deliver(&harness, &text_body("SMe", "+++")).await;
    assert!(body.contains("catch that"));
    assert_eq!(harness.store.call_count(), 0);
    assert_eq!(harness.message_count().await.unwrap(), 0);
}

#[tokio::test]
async fn model_failure_keeps_user_message() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.provider.fail_next("timeout");

    let body = deliver(&harness, &text_body("SMf", "Hello")).await;
    assert!(body.contains("having trouble"));

    let stored = harness.messages_for("+15551234567").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].direction, Direction::Inbound);
}

#[tokio::test]
async fn reply_survives_outbound_save_failure() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec!["Still here".into()])
        .build()
        .await
        .unwrap();
    harness.store.fail(Fault::AppendOutbound);

    let body = deliver(&harness, &text_body("SMo", "Hello")).await;
    assert!(body.contains("<Message>Still here</Message>"));
    assert_eq!(harness.message_count().await.unwrap(), 1);
}

// ---- Concurrency ----

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_contact_creates_one_conversation() {
    let harness = TestHarness::builder().build().await.unwrap();
    let user = harness
        .storage
        .get_or_create_user("+15559876543")
        .await
        .unwrap();

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let storage = Arc::clone(&harness.storage);
        let user_id = user.id.clone();
        tasks.push(tokio::spawn(async move {
            storage.get_or_create_conversation(&user_id).await.unwrap()
        }));
    }

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap());
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);
    assert_eq!(harness.conversation_count().await.unwrap(), 1);
}
