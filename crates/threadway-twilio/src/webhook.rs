// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook body decoding and shape classification.
//!
//! Twilio posts both inbound messages and delivery receipts as
//! `application/x-www-form-urlencoded`. The parser checks the fields this
//! crate relies on and keeps every other field untouched, so new Twilio
//! parameters pass through without a code change.

use std::collections::BTreeMap;

use crate::error::ParseError;

/// Decoded form fields, in the order they were sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookForm {
    pairs: Vec<(String, String)>,
}

impl WebhookForm {
    /// Decode a raw form body. The body itself must be UTF-8; percent-encoded
    /// sequences that are not are decoded lossily.
    pub fn from_bytes(body: &[u8]) -> Result<Self, ParseError> {
        let body = std::str::from_utf8(body).map_err(|e| ParseError::MalformedBody(e.to_string()))?;
        serde_urlencoded::from_str::<Vec<(String, String)>>(body)
            .map(|pairs| Self { pairs })
            .map_err(|e| ParseError::MalformedBody(e.to_string()))
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// First value sent for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First value for `key`, treating an empty or blank value as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// All fields as a map. For repeated keys the first value wins.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for (k, v) in &self.pairs {
            map.entry(k.clone()).or_insert_with(|| v.clone());
        }
        map
    }

    fn require(&self, key: &'static str) -> Result<String, ParseError> {
        self.get_non_empty(key)
            .map(str::to_string)
            .ok_or(ParseError::MissingField(key))
    }
}

/// An inbound WhatsApp message with its required fields checked.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub message_sid: String,
    pub account_sid: String,
    /// Sender address as sent, e.g. `whatsapp:+15551234567`.
    pub from: String,
    /// Recipient address as sent. Empty if Twilio omitted it.
    pub to: String,
    pub body: Option<String>,
    /// Every field, including the ones above and any Twilio adds later.
    pub fields: WebhookForm,
}

/// A delivery receipt for a message previously sent from this number.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusCallback {
    pub message_sid: Option<String>,
    pub message_status: String,
    pub error_code: Option<String>,
    pub fields: WebhookForm,
}

/// A webhook body classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedWebhook {
    Incoming(IncomingMessage),
    StatusCallback(StatusCallback),
}

const LOCATION_FIELDS: [&str; 2] = ["Latitude", "Longitude"];

impl ValidatedWebhook {
    /// Decode and classify a raw form body.
    pub fn parse(body: &[u8]) -> Result<Self, ParseError> {
        Self::from_form(WebhookForm::from_bytes(body)?)
    }

    /// Classify already-decoded fields.
    ///
    /// Non-empty `Body` means an incoming message. Otherwise a `MessageStatus`
    /// means a status callback. Otherwise any sign of message content (a
    /// `Body` key, `NumMedia`, or coordinates) still means an incoming
    /// message; anything else is [`ParseError::UnknownShape`].
    pub fn from_form(form: WebhookForm) -> Result<Self, ParseError> {
        if form.get_non_empty("Body").is_some() {
            return IncomingMessage::from_form(form).map(Self::Incoming);
        }

        if let Some(status) = form.get_non_empty("MessageStatus") {
            return Ok(Self::StatusCallback(StatusCallback {
                message_sid: form.get_non_empty("MessageSid").map(str::to_string),
                message_status: status.to_string(),
                error_code: form.get_non_empty("ErrorCode").map(str::to_string),
                fields: form,
            }));
        }

        let has_content = form.contains("Body")
            || form.contains("NumMedia")
            || LOCATION_FIELDS.iter().any(|k| form.contains(k));
        if has_content {
            return IncomingMessage::from_form(form).map(Self::Incoming);
        }

        Err(ParseError::UnknownShape)
    }
}

impl IncomingMessage {
    fn from_form(form: WebhookForm) -> Result<Self, ParseError> {
        Ok(Self {
            from: form.require("From")?,
            message_sid: form.require("MessageSid")?,
            account_sid: form.require("AccountSid")?,
            to: form.get("To").unwrap_or_default().to_string(),
            body: form.get("Body").map(str::to_string),
            fields: form,
        })
    }
}
