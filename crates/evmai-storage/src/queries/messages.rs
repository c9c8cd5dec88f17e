// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message and search-delta load/save operations.

use evmai_core::IndexerError;
use rusqlite::{Row, params};

use crate::codec::parsed;
use crate::database::{Database, map_tr_err};
use crate::models::{Message, SearchDelta};

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        conversation: row.get(1)?,
        message_cid: row.get(2)?,
        role: parsed(row, 3)?,
        created_at: row.get(4)?,
        transaction_hash: row.get(5)?,
    })
}

/// Insert or replace a message.
pub async fn save_message(db: &Database, message: &Message) -> Result<(), IndexerError> {
    let message = message.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, conversation, message_cid, role, created_at, transaction_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                     conversation = excluded.conversation,
                     message_cid = excluded.message_cid,
                     role = excluded.role,
                     created_at = excluded.created_at,
                     transaction_hash = excluded.transaction_hash",
                params![
                    message.id,
                    message.conversation,
                    message.message_cid,
                    message.role.to_string(),
                    message.created_at,
                    message.transaction_hash,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a message by key.
pub async fn get_message(db: &Database, id: &str) -> Result<Option<Message>, IndexerError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation, message_cid, role, created_at, transaction_hash
                 FROM messages WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], message_from_row);
            match result {
                Ok(message) => Ok(Some(message)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Messages of a conversation in creation order.
pub async fn get_messages_for_conversation(
    db: &Database,
    conversation: &str,
) -> Result<Vec<Message>, IndexerError> {
    let conversation = conversation.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation, message_cid, role, created_at, transaction_hash
                 FROM messages WHERE conversation = ?1
                 ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = stmt.query_map(params![conversation], message_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace a search delta.
pub async fn save_search_delta(db: &Database, delta: &SearchDelta) -> Result<(), IndexerError> {
    let delta = delta.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO search_deltas (id, message, search_delta_cid) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                     message = excluded.message,
                     search_delta_cid = excluded.search_delta_cid",
                params![delta.id, delta.message, delta.search_delta_cid],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a search delta by message key.
pub async fn get_search_delta(
    db: &Database,
    id: &str,
) -> Result<Option<SearchDelta>, IndexerError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn
                .prepare("SELECT id, message, search_delta_cid FROM search_deltas WHERE id = ?1")?;
            let result = stmt.query_row(params![id], |row| {
                Ok(SearchDelta {
                    id: row.get(0)?,
                    message: row.get(1)?,
                    search_delta_cid: row.get(2)?,
                })
            });
            match result {
                Ok(delta) => Ok(Some(delta)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRole;

    fn make_message(id: &str, role: MessageRole, created_at: u64) -> Message {
        Message {
            id: id.to_string(),
            conversation: "1".to_string(),
            message_cid: format!("cid-{id}"),
            role,
            created_at,
            transaction_hash: "0xfeed".to_string(),
        }
    }

    #[tokio::test]
    async fn messages_list_in_creation_order() {
        let db = Database::open_in_memory().await.unwrap();
        save_message(&db, &make_message("11", MessageRole::Assistant, 120))
            .await
            .unwrap();
        save_message(&db, &make_message("10", MessageRole::User, 110))
            .await
            .unwrap();

        let messages = get_messages_for_conversation(&db, "1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, "10");
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn get_message_roundtrips() {
        let db = Database::open_in_memory().await.unwrap();
        let message = make_message("10", MessageRole::User, 110);
        save_message(&db, &message).await.unwrap();
        assert_eq!(get_message(&db, "10").await.unwrap(), Some(message));
        assert!(get_message(&db, "11").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_delta_does_not_require_message() {
        let db = Database::open_in_memory().await.unwrap();
        let delta = SearchDelta {
            id: "99".to_string(),
            message: "99".to_string(),
            search_delta_cid: "bafy-delta".to_string(),
        };
        save_search_delta(&db, &delta).await.unwrap();
        assert_eq!(get_search_delta(&db, "99").await.unwrap(), Some(delta));
    }
}
