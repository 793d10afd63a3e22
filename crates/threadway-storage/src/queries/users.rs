// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User lookup and lazy creation, keyed by phone number.

use rusqlite::{params, OptionalExtension};
use threadway_core::types::{User, UserId};
use threadway_core::ThreadwayError;

use crate::database::{map_tr_err, now_timestamp, Database};

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId(row.get(0)?),
        phone_number: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Return the user owning `phone_number`, inserting it if absent.
///
/// New users are named after their phone number.
pub async fn get_or_create(db: &Database, phone_number: &str) -> Result<User, ThreadwayError> {
    let phone_number = phone_number.to_string();
    let candidate = uuid::Uuid::new_v4().to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| -> Result<User, rusqlite::Error> {
            conn.execute(
                "INSERT INTO users (id, phone_number, name, created_at, updated_at)
                 VALUES (?1, ?2, ?2, ?3, ?3)
                 ON CONFLICT(phone_number) DO NOTHING",
                params![candidate, phone_number, now],
            )?;
            conn.query_row(
                "SELECT id, phone_number, name, created_at FROM users WHERE phone_number = ?1",
                params![phone_number],
                row_to_user,
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Find a user by phone number.
pub async fn find_by_phone(
    db: &Database,
    phone_number: &str,
) -> Result<Option<User>, ThreadwayError> {
    let phone_number = phone_number.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<User>, rusqlite::Error> {
            conn.query_row(
                "SELECT id, phone_number, name, created_at FROM users WHERE phone_number = ?1",
                params![phone_number],
                row_to_user,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}
