// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query functions over [`Database`](crate::Database).

pub mod conversations;
pub mod messages;
pub mod users;

use std::str::FromStr;

/// Parse a TEXT column into a strum-backed enum.
pub(crate) fn parse_text_column<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
