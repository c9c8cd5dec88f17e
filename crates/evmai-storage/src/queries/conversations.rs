// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation load/save operations.

use evmai_core::{IndexerError, address_key};
use rusqlite::{Row, params};

use crate::codec::parsed;
use crate::database::{Database, map_tr_err};
use crate::models::Conversation;

const COLUMNS: &str = "id, owner, conversation_cid, metadata_cid, last_message_created_at, \
                       created_at_block, is_deleted, branched_from";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        owner: parsed(row, 1)?,
        conversation_cid: row.get(2)?,
        metadata_cid: row.get(3)?,
        last_message_created_at: row.get(4)?,
        created_at_block: row.get(5)?,
        is_deleted: row.get(6)?,
        branched_from: row.get(7)?,
    })
}

/// Insert or replace a conversation.
pub async fn save_conversation(
    db: &Database,
    conversation: &Conversation,
) -> Result<(), IndexerError> {
    let conversation = conversation.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversations (id, owner, conversation_cid, metadata_cid,
                     last_message_created_at, created_at_block, is_deleted, branched_from)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                     owner = excluded.owner,
                     conversation_cid = excluded.conversation_cid,
                     metadata_cid = excluded.metadata_cid,
                     last_message_created_at = excluded.last_message_created_at,
                     created_at_block = excluded.created_at_block,
                     is_deleted = excluded.is_deleted,
                     branched_from = excluded.branched_from",
                params![
                    conversation.id,
                    address_key(&conversation.owner),
                    conversation.conversation_cid,
                    conversation.metadata_cid,
                    conversation.last_message_created_at,
                    conversation.created_at_block,
                    conversation.is_deleted,
                    conversation.branched_from,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a conversation by key.
pub async fn get_conversation(
    db: &Database,
    id: &str,
) -> Result<Option<Conversation>, IndexerError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM conversations WHERE id = ?1"))?;
            match stmt.query_row(params![id], from_row) {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Conversations whose freshness marker is strictly greater than `since`,
/// oldest change first. This is the query a sync poller runs.
pub async fn list_changed_since(
    db: &Database,
    since: u64,
) -> Result<Vec<Conversation>, IndexerError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM conversations
                 WHERE last_message_created_at > ?1
                 ORDER BY last_message_created_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![since], from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
