// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel address normalization and masking.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static E164: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").unwrap());

const CHANNEL_PREFIX: &str = "whatsapp:";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("sender address is empty")]
    Empty,
    #[error("sender address is not an E.164 phone number")]
    NotE164,
}

/// Strip the `whatsapp:` prefix and validate the rest as E.164.
///
/// ```
/// use threadway_agent::address::normalize_address;
/// assert_eq!(normalize_address("whatsapp:+15551234567").unwrap(), "+15551234567");
/// ```
pub fn normalize_address(raw: &str) -> Result<String, AddressError> {
    let trimmed = raw.trim();
    let number = match trimmed.get(..CHANNEL_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(CHANNEL_PREFIX) => {
            trimmed[CHANNEL_PREFIX.len()..].trim()
        }
        _ => trimmed,
    };
    if number.is_empty() {
        return Err(AddressError::Empty);
    }
    if !E164.is_match(number) {
        return Err(AddressError::NotE164);
    }
    Ok(number.to_string())
}

/// Mask a phone number for logs: `+15551234567` becomes `+1555***4567`.
pub fn mask_phone(number: &str) -> String {
    let chars: Vec<char> = number.chars().collect();
    if chars.len() < 9 {
        return "***".to_string();
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}***{tail}")
}
