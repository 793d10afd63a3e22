// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio message to [`DomainMessage`] mapping.
//!
//! Classification precedence: coordinates, then media (bucketed by the
//! first attachment's content type), then text. Numeric fields that do not
//! parse are treated as absent, so a bad value degrades the classification
//! instead of failing the message.

use threadway_core::types::{LocationAttachment, MediaAttachment};
use threadway_core::{DomainMessage, MessageKind};

use crate::webhook::{IncomingMessage, WebhookForm};

/// Twilio delivers at most this many attachments per WhatsApp message.
pub const MAX_MEDIA: usize = 10;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Map a validated Twilio message to the provider-agnostic form.
pub fn normalize(message: &IncomingMessage) -> DomainMessage {
    let fields = &message.fields;
    let location = extract_location(fields);
    let media = extract_media(fields);

    let kind = if location.is_some() {
        MessageKind::Location
    } else if declared_media_count(fields).is_some_and(|n| n > 0) {
        // Classified from the declared first attachment even when its URL is missing.
        fields
            .get_non_empty("MediaContentType0")
            .map_or(MessageKind::Document, media_kind)
    } else {
        MessageKind::Text
    };

    DomainMessage {
        kind,
        from: message.from.clone(),
        to: message.to.clone(),
        text: message.body.clone(),
        media,
        location,
        provider_message_id: Some(message.message_sid.clone()),
        raw: raw_payload(fields),
    }
}

/// Bucket a MIME type into a message kind.
pub fn media_kind(content_type: &str) -> MessageKind {
    let major = content_type
        .split('/')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match major.as_str() {
        "image" => MessageKind::Image,
        "audio" => MessageKind::Audio,
        "video" => MessageKind::Video,
        _ => MessageKind::Document,
    }
}

/// Declared attachment count, or `None` if absent or unparseable.
fn declared_media_count(fields: &WebhookForm) -> Option<usize> {
    fields.get("NumMedia")?.trim().parse().ok()
}

/// Walk `MediaUrl{i}`/`MediaContentType{i}` for `i` below the declared count
/// (capped at [`MAX_MEDIA`]), skipping indices without a URL.
pub fn extract_media(fields: &WebhookForm) -> Vec<MediaAttachment> {
    let count = declared_media_count(fields).unwrap_or(0).min(MAX_MEDIA);
    (0..count)
        .filter_map(|i| {
            let url = fields.get_non_empty(&format!("MediaUrl{i}"))?;
            let content_type = fields
                .get_non_empty(&format!("MediaContentType{i}"))
                .unwrap_or(DEFAULT_CONTENT_TYPE);
            Some(MediaAttachment {
                url: url.to_string(),
                content_type: content_type.to_string(),
            })
        })
        .collect()
}

/// Coordinates when both parse to finite numbers in range.
pub fn extract_location(fields: &WebhookForm) -> Option<LocationAttachment> {
    let coordinate = |key: &str, limit: f64| {
        fields
            .get(key)?
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.abs() <= limit)
    };
    Some(LocationAttachment {
        latitude: coordinate("Latitude", 90.0)?,
        longitude: coordinate("Longitude", 180.0)?,
        address: fields
            .get_non_empty("Address")
            .or_else(|| fields.get_non_empty("Label"))
            .map(str::to_string),
    })
}

fn raw_payload(fields: &WebhookForm) -> serde_json::Value {
    serde_json::Value::Object(
        fields
            .to_map()
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn incoming(extra: &[(&str, &str)]) -> IncomingMessage {
        let mut pairs = vec![
            ("From", "whatsapp:+15551234567"),
            ("To", "whatsapp:+14155238886"),
            ("MessageSid", "SM1"),
            ("AccountSid", "AC1"),
        ];
        pairs.extend_from_slice(extra);
        let form = WebhookForm::from_pairs(pairs.iter().copied());
        IncomingMessage {
            message_sid: "SM1".to_string(),
            account_sid: "AC1".to_string(),
            from: "whatsapp:+15551234567".to_string(),
            to: "whatsapp:+14155238886".to_string(),
            body: form.get("Body").map(str::to_string),
            fields: form,
        }
    }

    #[test]
    fn plain_text() {
        let msg = normalize(&incoming(&[("Body", "Hi"), ("NumMedia", "0")]));
        assert_eq!(msg.kind, MessageKind::Text);
        assert_eq!(msg.text.as_deref(), Some("Hi"));
        assert!(msg.media.is_empty());
        assert!(msg.location.is_none());
        assert_eq!(msg.provider_message_id.as_deref(), Some("SM1"));
        assert_eq!(msg.raw["Body"], "Hi");
    }

    #[test]
    fn location_beats_body() {
        let msg = normalize(&incoming(&[
            ("Body", "meet here"),
            ("Latitude", "37.7749"),
            ("Longitude", "-122.4194"),
            ("Address", "San Francisco"),
        ]));
        assert_eq!(msg.kind, MessageKind::Location);
        let loc = msg.location.unwrap();
        assert_eq!(loc.latitude, 37.7749);
        assert_eq!(loc.longitude, -122.4194);
        assert_eq!(loc.address.as_deref(), Some("San Francisco"));
        assert_eq!(msg.text.as_deref(), Some("meet here"));
    }

    #[test]
    fn location_beats_media() {
        let msg = normalize(&incoming(&[
            ("Latitude", "1.5"),
            ("Longitude", "2.5"),
            ("NumMedia", "1"),
            ("MediaUrl0", "https://api.twilio.com/m/0"),
            ("MediaContentType0", "image/png"),
        ]));
        assert_eq!(msg.kind, MessageKind::Location);
        assert_eq!(msg.media.len(), 1);
    }

    #[test]
    fn media_buckets_by_first_content_type() {
        for (content_type, kind) in [
            ("image/png", MessageKind::Image),
            ("audio/ogg", MessageKind::Audio),
            ("video/mp4", MessageKind::Video),
            ("application/pdf", MessageKind::Document),
        ] {
            let msg = normalize(&incoming(&[
                ("NumMedia", "1"),
                ("MediaUrl0", "https://api.twilio.com/m/0"),
                ("MediaContentType0", content_type),
            ]));
            assert_eq!(msg.kind, kind, "{content_type}");
            assert_eq!(msg.media[0].content_type, content_type);
        }
    }

    #[test]
    fn missing_url_is_skipped() {
        let msg = normalize(&incoming(&[
            ("NumMedia", "3"),
            ("MediaUrl0", "https://api.twilio.com/m/0"),
            ("MediaContentType0", "image/jpeg"),
            ("MediaContentType1", "audio/ogg"),
            ("MediaUrl2", "https://api.twilio.com/m/2"),
        ]));
        let urls: Vec<_> = msg.media.iter().map(|m| m.url.as_str()).collect();
        assert_eq!(urls, ["https://api.twilio.com/m/0", "https://api.twilio.com/m/2"]);
        assert_eq!(msg.media[1].content_type, "application/octet-stream");
    }

    #[test]
    fn media_beyond_declared_count_is_ignored() {
        let msg = normalize(&incoming(&[
            ("NumMedia", "1"),
            ("MediaUrl0", "https://api.twilio.com/m/0"),
            ("MediaUrl1", "https://api.twilio.com/m/1"),
        ]));
        assert_eq!(msg.media.len(), 1);
    }

    #[test]
    fn unparseable_numbers_degrade() {
        let msg = normalize(&incoming(&[
            ("Body", "hello"),
            ("Latitude", "north"),
            ("Longitude", "-122.4"),
            ("NumMedia", "lots"),
            ("MediaUrl0", "https://api.twilio.com/m/0"),
        ]));
        assert_eq!(msg.kind, MessageKind::Text);
        assert!(msg.location.is_none());
        assert!(msg.media.is_empty());
    }

    #[test]
    fn nan_and_out_of_range_coordinates_are_absent() {
        for (lat, lon) in [("NaN", "1"), ("1", "inf"), ("91", "0"), ("0", "-181")] {
            let msg = normalize(&incoming(&[("Latitude", lat), ("Longitude", lon)]));
            assert!(msg.location.is_none(), "{lat},{lon}");
        }
    }

    #[test]
    fn declared_media_without_urls_keeps_its_kind() {
        let msg = normalize(&incoming(&[
            ("Body", ""),
            ("NumMedia", "1"),
            ("MediaContentType0", "image/png"),
        ]));
        assert_eq!(msg.kind, MessageKind::Image);
        assert!(msg.media.is_empty());
    }

    #[test]
    fn declared_media_without_content_type_is_document() {
        let msg = normalize(&incoming(&[("Body", ""), ("NumMedia", "2")]));
        assert_eq!(msg.kind, MessageKind::Document);
        assert!(msg.media.is_empty());
    }

    #[test]
    fn zero_declared_media_is_text() {
        let msg = normalize(&incoming(&[
            ("Body", "hi"),
            ("NumMedia", "0"),
            ("MediaContentType0", "image/png"),
        ]));
        assert_eq!(msg.kind, MessageKind::Text);
    }

    proptest! {
        #[test]
        fn never_panics_and_media_is_bounded(
            num_media in ".{0,6}",
            lat in ".{0,12}",
            lon in ".{0,12}",
            body in ".{0,40}",
        ) {
            let mut extra: Vec<(String, String)> = vec![
                ("Body".into(), body),
                ("NumMedia".into(), num_media),
                ("Latitude".into(), lat),
                ("Longitude".into(), lon),
            ];
            for i in 0..12 {
                extra.push((format!("MediaUrl{i}"), format!("https://m/{i}")));
            }
            let refs: Vec<(&str, &str)> =
                extra.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            let msg = normalize(&incoming(&refs));

            prop_assert!(msg.media.len() <= MAX_MEDIA);
            if msg.location.is_some() {
                prop_assert_eq!(msg.kind, MessageKind::Location);
            }
        }

        #[test]
        fn declared_count_bounds_media(n in 0usize..20) {
            let count = n.to_string();
            let mut pairs: Vec<(String, String)> = vec![("NumMedia".into(), count)];
            for i in 0..20 {
                pairs.push((format!("MediaUrl{i}"), format!("https://m/{i}")));
            }
            let form = WebhookForm::from_pairs(pairs);
            prop_assert_eq!(extract_media(&form).len(), n.min(MAX_MEDIA));
        }
    }
}
