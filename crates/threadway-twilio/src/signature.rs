// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `X-Twilio-Signature` verification.
//!
//! Twilio signs each webhook with `base64(HMAC-SHA1(auth_token, data))`,
//! where `data` is the full callback URL followed by every POST parameter
//! as `key` + `value`, sorted by key. The URL must be the one Twilio called,
//! which behind a reverse proxy or tunnel differs from what the server sees,
//! so it is rebuilt from the forwarding headers (or a configured public URL).

use axum::http::{HeaderMap, Uri};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use tracing::debug;

use crate::error::SignatureError;

type HmacSha1 = Hmac<Sha1>;

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "x-twilio-signature";

/// Verifies webhook requests against an account auth token.
#[derive(Clone)]
pub struct SignatureVerifier {
    auth_token: String,
    public_url: Option<String>,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("auth_token", &"[REDACTED]")
            .field("public_url", &self.public_url)
            .finish()
    }
}

impl SignatureVerifier {
    /// `public_url` (scheme and host, e.g. `https://bot.example.com`) replaces
    /// whatever the Host headers say when rebuilding the signed URL.
    pub fn new(auth_token: impl Into<String>, public_url: Option<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            public_url: public_url.map(|u| u.trim_end_matches('/').to_string()),
        }
    }

    /// Check a request given its headers, URI and raw body.
    ///
    /// The body is only borrowed, so the caller can parse it afterwards.
    pub fn verify_request(
        &self,
        headers: &HeaderMap,
        uri: &Uri,
        body: &[u8],
    ) -> Result<bool, SignatureError> {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .ok_or(SignatureError::MissingHeader)?
            .to_str()
            .map_err(|e| SignatureError::MalformedHeader(e.to_string()))?;

        let params: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| SignatureError::MalformedHeader(format!("unsigned body: {e}")))?;

        let url = self.callback_url(headers, uri);
        let valid = self.verify(&url, &params, signature)?;
        if !valid {
            debug!(%url, "signature mismatch");
        }
        Ok(valid)
    }

    /// Check `signature` for `url` and form `params`.
    pub fn verify(
        &self,
        url: &str,
        params: &[(String, String)],
        signature: &str,
    ) -> Result<bool, SignatureError> {
        let expected = STANDARD
            .decode(signature.trim())
            .map_err(|e| SignatureError::MalformedHeader(e.to_string()))?;
        let mac = self.mac_for(url, params)?;
        Ok(mac.verify_slice(&expected).is_ok())
    }

    /// The base64 signature Twilio would send for `url` and `params`.
    pub fn sign(&self, url: &str, params: &[(String, String)]) -> Result<String, SignatureError> {
        let mac = self.mac_for(url, params)?;
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    fn mac_for(&self, url: &str, params: &[(String, String)]) -> Result<HmacSha1, SignatureError> {
        if self.auth_token.is_empty() {
            return Err(SignatureError::InvalidKey);
        }
        let mut mac = HmacSha1::new_from_slice(self.auth_token.as_bytes())
            .map_err(|_| SignatureError::InvalidKey)?;
        mac.update(url.as_bytes());

        let mut sorted: Vec<&(String, String)> = params.iter().collect();
        sorted.sort();
        for (key, value) in sorted {
            mac.update(key.as_bytes());
            mac.update(value.as_bytes());
        }
        Ok(mac)
    }

    /// Rebuild the URL Twilio called.
    ///
    /// Precedence: configured public URL, then `X-Forwarded-Proto` +
    /// `X-Forwarded-Host`, then `Host` (scheme from `X-Forwarded-Proto`,
    /// default `https`).
    pub fn callback_url(&self, headers: &HeaderMap, uri: &Uri) -> String {
        let path = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        if let Some(base) = &self.public_url {
            return format!("{base}{path}");
        }

        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.split(',').next().unwrap_or(v).trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let proto = header("x-forwarded-proto");

        match (header("x-forwarded-host"), proto.as_deref()) {
            (Some(host), Some(proto)) => format!("{proto}://{host}{path}"),
            _ => {
                let host = header("host")
                    .or_else(|| uri.authority().map(|a| a.to_string()))
                    .unwrap_or_default();
                format!("{}://{host}{path}", proto.as_deref().unwrap_or("https"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    // Published example from Twilio's webhook security documentation.
    const DOC_TOKEN: &str = "12345";
    const DOC_URL: &str = "https://mycompany.com/myapp.php?foo=1&bar=2";
    const DOC_SIGNATURE: &str = "GvWf1cFY/Q7PnoempGyD5oXAezc=";

    fn doc_params() -> Vec<(String, String)> {
        [
            ("CallSid", "CA1234567890ABCDE"),
            ("Caller", "+14158675310"),
            ("Digits", "1234"),
            ("From", "+14158675310"),
            ("To", "+18005551212"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn matches_documented_signature() {
        let verifier = SignatureVerifier::new(DOC_TOKEN, None);
        assert_eq!(verifier.sign(DOC_URL, &doc_params()).unwrap(), DOC_SIGNATURE);
        assert!(verifier.verify(DOC_URL, &doc_params(), DOC_SIGNATURE).unwrap());
    }

    #[test]
    fn parameter_order_does_not_matter() {
        let verifier = SignatureVerifier::new(DOC_TOKEN, None);
        let mut params = doc_params();
        params.reverse();
        assert!(verifier.verify(DOC_URL, &params, DOC_SIGNATURE).unwrap());
    }

    #[test]
    fn tampered_param_fails() {
        let verifier = SignatureVerifier::new(DOC_TOKEN, None);
        let mut params = doc_params();
        params[2].1 = "9999".to_string();
        assert!(!verifier.verify(DOC_URL, &params, DOC_SIGNATURE).unwrap());
    }

    #[test]
    fn wrong_token_fails() {
        let verifier = SignatureVerifier::new("54321", None);
        assert!(!verifier.verify(DOC_URL, &doc_params(), DOC_SIGNATURE).unwrap());
    }

    #[test]
    fn non_base64_header_is_malformed() {
        let verifier = SignatureVerifier::new(DOC_TOKEN, None);
        let err = verifier.verify(DOC_URL, &doc_params(), "not base64!!").unwrap_err();
        assert!(matches!(err, SignatureError::MalformedHeader(_)));
    }

    #[test]
    fn empty_token_is_invalid_key() {
        let verifier = SignatureVerifier::new("", None);
        assert_eq!(
            verifier.sign(DOC_URL, &doc_params()).unwrap_err(),
            SignatureError::InvalidKey
        );
    }

    #[test]
    fn missing_header_is_an_error() {
        let verifier = SignatureVerifier::new(DOC_TOKEN, None);
        let uri: Uri = "/webhooks/twilio".parse().unwrap();
        let err = verifier
            .verify_request(&HeaderMap::new(), &uri, b"From=x")
            .unwrap_err();
        assert_eq!(err, SignatureError::MissingHeader);
    }

    #[test]
    fn forwarded_headers_rebuild_public_url() {
        let verifier = SignatureVerifier::new(DOC_TOKEN, None);
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("127.0.0.1:3000"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("abc.ngrok.app"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        let uri: Uri = "/webhooks/twilio?x=1".parse().unwrap();

        assert_eq!(
            verifier.callback_url(&headers, &uri),
            "https://abc.ngrok.app/webhooks/twilio?x=1"
        );
    }

    #[test]
    fn host_header_defaults_to_https() {
        let verifier = SignatureVerifier::new(DOC_TOKEN, None);
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("bot.example.com"));
        let uri: Uri = "/webhooks/twilio".parse().unwrap();
        assert_eq!(
            verifier.callback_url(&headers, &uri),
            "https://bot.example.com/webhooks/twilio"
        );
    }

    #[test]
    fn public_url_overrides_headers() {
        let verifier =
            SignatureVerifier::new(DOC_TOKEN, Some("https://bot.example.com/".to_string()));
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("internal:3000"));
        let uri: Uri = "/webhooks/twilio".parse().unwrap();
        assert_eq!(
            verifier.callback_url(&headers, &uri),
            "https://bot.example.com/webhooks/twilio"
        );
    }

    #[test]
    fn verify_request_round_trip() {
        let verifier = SignatureVerifier::new("secret", None);
        let body = b"Body=Hi&From=whatsapp%3A%2B15551234567&MessageSid=SM1";
        let params: Vec<(String, String)> = serde_urlencoded::from_bytes(body).unwrap();
        let signature = verifier
            .sign("https://bot.example.com/webhooks/twilio", &params)
            .unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("bot.example.com"));
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_str(&signature).unwrap());
        let uri: Uri = "/webhooks/twilio".parse().unwrap();

        assert!(verifier.verify_request(&headers, &uri, body).unwrap());
        assert!(!verifier
            .verify_request(&headers, &uri, b"Body=Bye&From=whatsapp%3A%2B15551234567&MessageSid=SM1")
            .unwrap());
    }
}
