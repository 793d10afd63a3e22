// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TwiML reply envelopes.
//!
//! Twilio expects a well-formed TwiML document in reply to every webhook it
//! calls. [`encode`] never fails: text that cannot be represented falls back
//! to a fixed apology.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::EncodeError;

/// Content type of every TwiML reply.
pub const CONTENT_TYPE: &str = "text/xml";

/// Reply sent when the real reply cannot be encoded or produced.
pub const FALLBACK_APOLOGY: &str =
    "I'm having trouble processing your message right now. Please try again later.";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// A reply body plus the content type to send it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelReply {
    pub content_type: &'static str,
    pub body: String,
}

impl IntoResponse for ChannelReply {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, self.content_type)],
            self.body,
        )
            .into_response()
    }
}

/// Wrap `text` in a `<Response><Message>` envelope.
pub fn try_encode(text: &str) -> Result<ChannelReply, EncodeError> {
    let escaped = escape_xml(text)?;
    Ok(ChannelReply {
        content_type: CONTENT_TYPE,
        body: format!("{XML_DECLARATION}<Response><Message>{escaped}</Message></Response>"),
    })
}

/// Like [`try_encode`], falling back to the apology envelope on failure.
pub fn encode(text: &str) -> ChannelReply {
    match try_encode(text) {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(error = %e, "reply text not encodable, sending fallback");
            fallback()
        }
    }
}

/// The fixed apology envelope.
pub fn fallback() -> ChannelReply {
    ChannelReply {
        content_type: CONTENT_TYPE,
        body: format!(
            "{XML_DECLARATION}<Response><Message>{FALLBACK_APOLOGY}</Message></Response>"
        ),
    }
}

/// An envelope with no message, used to acknowledge status callbacks.
pub fn empty() -> ChannelReply {
    ChannelReply {
        content_type: CONTENT_TYPE,
        body: format!("{XML_DECLARATION}<Response></Response>"),
    }
}

/// Escape markup characters, rejecting code points XML 1.0 cannot carry.
fn escape_xml(text: &str) -> Result<String, EncodeError> {
    let mut out = String::with_capacity(text.len());
    for (position, ch) in text.char_indices() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(ch),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {
                return Err(EncodeError::InvalidCharacter {
                    code: c as u32,
                    position,
                });
            }
            c => out.push(c),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn envelope_snapshot() {
        let reply = encode("Hello! How can I help you today?");
        assert_eq!(reply.content_type, "text/xml");
        insta::assert_snapshot!(reply.body, @r#"<?xml version="1.0" encoding="UTF-8"?><Response><Message>Hello! How can I help you today?</Message></Response>"#);
    }

    #[test]
    fn escapes_markup() {
        let reply = try_encode(r#"1 < 2 && "x" > 'y'"#).unwrap();
        assert!(reply
            .body
            .contains("<Message>1 &lt; 2 &amp;&amp; &quot;x&quot; &gt; &apos;y&apos;</Message>"));
    }

    #[test]
    fn keeps_newlines_and_unicode() {
        let reply = try_encode("line one\nline two 👋").unwrap();
        assert!(reply.body.contains("line one\nline two 👋"));
    }

    #[test]
    fn control_character_is_rejected() {
        let err = try_encode("bell\u{7}").unwrap_err();
        assert_eq!(err, EncodeError::InvalidCharacter { code: 7, position: 4 });
    }

    #[test]
    fn encode_falls_back_to_apology() {
        let reply = encode("bad\u{0}text");
        assert_eq!(reply, fallback());
        assert!(reply.body.contains(FALLBACK_APOLOGY));
    }

    #[test]
    fn empty_envelope_has_no_message() {
        let reply = empty();
        assert!(reply.body.ends_with("<Response></Response>"));
        assert!(!reply.body.contains("<Message>"));
    }

    #[test]
    fn into_response_sets_status_and_content_type() {
        let response = encode("hi").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/xml"
        );
    }

    proptest! {
        #[test]
        fn encode_always_yields_one_message_element(text in any::<String>()) {
            let reply = encode(&text);
            prop_assert_eq!(reply.content_type, CONTENT_TYPE);
            prop_assert!(reply.body.starts_with(XML_DECLARATION));
            prop_assert!(reply.body.ends_with("</Message></Response>"));
            prop_assert_eq!(reply.body.matches("<Message>").count(), 1);
        }
    }
}
