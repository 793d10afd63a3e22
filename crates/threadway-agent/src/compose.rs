// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text sent to the model (and stored) for an inbound message.
//!
//! The message body comes first, then one bracketed line per attachment and
//! one for a shared location, so media-only and location-only messages still
//! carry content.

use threadway_core::types::{LocationAttachment, MediaAttachment};
use threadway_core::DomainMessage;

/// Compose the user turn for `message`. Empty when there is nothing to say.
pub fn compose_user_text(message: &DomainMessage) -> String {
    let mut lines = Vec::new();

    if let Some(text) = message.text.as_deref().map(str::trim)
        && !text.is_empty()
    {
        lines.push(text.to_string());
    }
    lines.extend(message.media.iter().map(describe_media));
    if let Some(location) = &message.location {
        lines.push(describe_location(location));
    }

    lines.join("\n")
}

fn describe_media(media: &MediaAttachment) -> String {
    let label = match media.content_type.split('/').next().unwrap_or_default() {
        "image" => "image",
        "audio" => "audio",
        "video" => "video",
        _ => "file",
    };
    format!("[Attached {label}: {}]", media.content_type)
}

fn describe_location(location: &LocationAttachment) -> String {
    match &location.address {
        Some(address) => format!(
            "[Shared location: {}, {} ({address})]",
            location.latitude, location.longitude
        ),
        None => format!(
            "[Shared location: {}, {}]",
            location.latitude, location.longitude
        ),
    }
}
