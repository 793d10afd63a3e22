// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation lookup and creation.

use rusqlite::{params, OptionalExtension};
use threadway_core::types::{Conversation, ConversationId, UserId};
use threadway_core::ThreadwayError;

use crate::database::{map_tr_err, now_timestamp, Database};

const CONVERSATION_COLUMNS: &str = "id, user_id, display_name, is_active, message_count, \
     last_message_at, created_at, updated_at";

fn row_to_conversation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: ConversationId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        display_name: row.get(2)?,
        is_active: row.get(3)?,
        message_count: row.get(4)?,
        last_message_at: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Return the id of `user_id`'s conversation, inserting one if none exists.
///
/// The insert is `ON CONFLICT(user_id) DO NOTHING`, so racing callers
/// (even from separate processes sharing the file) converge on one row.
pub async fn get_or_create(db: &Database, user_id: &UserId) -> Result<ConversationId, ThreadwayError> {
    let user_id = user_id.0.clone();
    let candidate = uuid::Uuid::new_v4().to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| -> Result<ConversationId, rusqlite::Error> {
            conn.execute(
                "INSERT INTO conversations (id, user_id, is_active, message_count,
                     last_message_at, created_at, updated_at)
                 VALUES (?1, ?2, 1, 0, ?3, ?3, ?3)
                 ON CONFLICT(user_id) DO NOTHING",
                params![candidate, user_id, now],
            )?;
            let id: String = conn.query_row(
                "SELECT id FROM conversations WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )?;
            Ok(ConversationId(id))
        })
        .await
        .map_err(map_tr_err)
}

/// Find `user_id`'s conversation without creating it.
pub async fn find_by_user(
    db: &Database,
    user_id: &UserId,
) -> Result<Option<Conversation>, ThreadwayError> {
    let user_id = user_id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Option<Conversation>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE user_id = ?1"),
                params![user_id],
                row_to_conversation,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a conversation by id.
pub async fn get(
    db: &Database,
    id: &ConversationId,
) -> Result<Option<Conversation>, ThreadwayError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Option<Conversation>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"),
                params![id],
                row_to_conversation,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Number of conversation rows. Used by health and tests.
pub async fn count(db: &Database) -> Result<i64, ThreadwayError> {
    db.connection()
        .call(|conn| -> Result<i64, rusqlite::Error> {
            conn.query_row("SELECT COUNT(*) FROM conversations", [], |row| row.get(0))
        })
        .await
        .map_err(map_tr_err)
}
