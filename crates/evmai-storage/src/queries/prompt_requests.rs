// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt request load/save operations.

use alloy_primitives::Bytes;
use evmai_core::{IndexerError, address_key};
use rusqlite::params;

use crate::codec::parsed;
use crate::database::{Database, map_tr_err};
use crate::models::PromptRequest;

/// Insert or replace a prompt request.
pub async fn save_prompt_request(
    db: &Database,
    request: &PromptRequest,
) -> Result<(), IndexerError> {
    let request = request.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO prompt_requests (id, prompt_message_id, conversation, user,
                     encrypted_payload, is_cancelled, is_answered, is_refunded, created_at,
                     transaction_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(id) DO UPDATE SET
                     prompt_message_id = excluded.prompt_message_id,
                     conversation = excluded.conversation,
                     user = excluded.user,
                     encrypted_payload = excluded.encrypted_payload,
                     is_cancelled = excluded.is_cancelled,
                     is_answered = excluded.is_answered,
                     is_refunded = excluded.is_refunded,
                     created_at = excluded.created_at,
                     transaction_hash = excluded.transaction_hash",
                params![
                    request.id,
                    request.prompt_message_id,
                    request.conversation,
                    address_key(&request.user),
                    request.encrypted_payload.to_vec(),
                    request.is_cancelled,
                    request.is_answered,
                    request.is_refunded,
                    request.created_at,
                    request.transaction_hash,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a prompt request by answer-message key.
pub async fn get_prompt_request(
    db: &Database,
    id: &str,
) -> Result<Option<PromptRequest>, IndexerError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, prompt_message_id, conversation, user, encrypted_payload,
                        is_cancelled, is_answered, is_refunded, created_at, transaction_hash
                 FROM prompt_requests WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], |row| {
                let payload: Vec<u8> = row.get(4)?;
                Ok(PromptRequest {
                    id: row.get(0)?,
                    prompt_message_id: row.get(1)?,
                    conversation: row.get(2)?,
                    user: parsed(row, 3)?,
                    encrypted_payload: Bytes::from(payload),
                    is_cancelled: row.get(5)?,
                    is_answered: row.get(6)?,
                    is_refunded: row.get(7)?,
                    created_at: row.get(8)?,
                    transaction_hash: row.get(9)?,
                })
            });
            match result {
                Ok(request) => Ok(Some(request)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}
