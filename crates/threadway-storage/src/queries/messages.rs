// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message append and load operations.

use rusqlite::{params, OptionalExtension};
use threadway_core::types::{ConversationId, Direction, Message, NewMessage};
use threadway_core::ThreadwayError;

use crate::database::{map_tr_err, now_timestamp, Database};
use crate::queries::parse_text_column;

/// Delivery status recorded for a freshly stored message.
fn initial_status(direction: Direction) -> &'static str {
    match direction {
        Direction::Inbound => "received",
        Direction::Outbound => "sent",
    }
}

/// Append a message and bump the owning conversation's counters in one
/// transaction.
///
/// The stored `created_at` never sorts before the conversation's previous
/// message, even if the wall clock steps backwards. A requested id that is
/// already taken is replaced with a generated UUID.
pub async fn append(
    db: &Database,
    conversation_id: &ConversationId,
    message: &NewMessage,
) -> Result<Message, ThreadwayError> {
    let conversation_id = conversation_id.clone();
    let message = message.clone();
    let now = now_timestamp();
    let generated_id = uuid::Uuid::new_v4().to_string();

    db.connection()
        .call(move |conn| -> Result<Message, rusqlite::Error> {
            let tx = conn.transaction()?;

            let last: String = tx.query_row(
                "SELECT last_message_at FROM conversations WHERE id = ?1",
                params![conversation_id.0],
                |row| row.get(0),
            )?;
            let created_at = if last > now { last } else { now };

            let id = match message.id {
                Some(requested) => {
                    let taken: Option<i64> = tx
                        .query_row(
                            "SELECT 1 FROM messages WHERE id = ?1",
                            params![requested],
                            |row| row.get(0),
                        )
                        .optional()?;
                    if taken.is_some() { generated_id } else { requested }
                }
                None => generated_id,
            };

            tx.execute(
                "INSERT INTO messages (id, conversation_id, content, message_type, direction,
                     status, provider_sid, media_url, media_type, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
                params![
                    id,
                    conversation_id.0,
                    message.content,
                    message.message_type.to_string(),
                    message.direction.to_string(),
                    initial_status(message.direction),
                    message.provider_sid,
                    message.media_url,
                    message.media_type,
                    created_at,
                ],
            )?;

            tx.execute(
                "UPDATE conversations
                 SET message_count = message_count + 1,
                     last_message_at = ?2,
                     updated_at = ?2
                 WHERE id = ?1",
                params![conversation_id.0, created_at],
            )?;

            tx.commit()?;

            Ok(Message {
                id,
                conversation_id,
                content: message.content,
                direction: message.direction,
                message_type: message.message_type,
                media_url: message.media_url,
                media_type: message.media_type,
                provider_sid: message.provider_sid,
                created_at,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Load a conversation's messages oldest first. Equal timestamps keep
/// insertion order.
pub async fn load(
    db: &Database,
    conversation_id: &ConversationId,
) -> Result<Vec<Message>, ThreadwayError> {
    let conversation_id = conversation_id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Vec<Message>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, content, direction, message_type,
                        media_url, media_type, provider_sid, created_at
                 FROM messages
                 WHERE conversation_id = ?1
                 ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = stmt.query_map(params![conversation_id], |row| {
                Ok(Message {
                    id: row.get(0)?,
                    conversation_id: ConversationId(row.get(1)?),
                    content: row.get(2)?,
                    direction: parse_text_column(3, row.get(3)?)?,
                    message_type: parse_text_column(4, row.get(4)?)?,
                    media_url: row.get(5)?,
                    media_type: row.get(6)?,
                    provider_sid: row.get(7)?,
                    created_at: row.get(8)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Total number of stored messages across all conversations.
pub async fn count(db: &Database) -> Result<i64, ThreadwayError> {
    db.connection()
        .call(|conn| -> Result<i64, rusqlite::Error> {
            conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
        })
        .await
        .map_err(map_tr_err)
}
