// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Indexer cursor and entity counts.

use evmai_core::{EventPosition, IndexerError};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::{EntityCounts, IndexerCursor};

/// Load the position of the last handled event, if any.
pub async fn load_cursor(db: &Database) -> Result<Option<IndexerCursor>, IndexerError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT block_number, transaction_index, log_index, updated_at
                 FROM indexer_cursor WHERE id = 1",
            )?;
            let result = stmt.query_row([], |row| {
                Ok(IndexerCursor {
                    position: EventPosition {
                        block_number: row.get(0)?,
                        transaction_index: row.get(1)?,
                        log_index: row.get(2)?,
                    },
                    updated_at: row.get(3)?,
                })
            });
            match result {
                Ok(cursor) => Ok(Some(cursor)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite the single cursor row.
pub async fn save_cursor(db: &Database, cursor: &IndexerCursor) -> Result<(), IndexerError> {
    let cursor = *cursor;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO indexer_cursor (id, block_number, transaction_index, log_index, updated_at)
                 VALUES (1, ?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                     block_number = excluded.block_number,
                     transaction_index = excluded.transaction_index,
                     log_index = excluded.log_index,
                     updated_at = excluded.updated_at",
                params![
                    cursor.position.block_number,
                    cursor.position.transaction_index,
                    cursor.position.log_index,
                    cursor.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Row count of every entity table.
pub async fn entity_counts(db: &Database) -> Result<EntityCounts, IndexerError> {
    db.connection()
        .call(|conn| {
            let count = |table: &str| -> rusqlite::Result<u64> {
                conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })
            };
            Ok(EntityCounts {
                conversations: count("conversations")?,
                messages: count("messages")?,
                search_deltas: count("search_deltas")?,
                prompt_requests: count("prompt_requests")?,
                payments: count("payments")?,
                spending_limits: count("spending_limits")?,
                activities: count("activities")?,
            })
        })
        .await
        .map_err(map_tr_err)
}
