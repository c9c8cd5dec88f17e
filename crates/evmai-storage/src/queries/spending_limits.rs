// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spending limit load/save/delete operations.

use evmai_core::{IndexerError, address_key};
use rusqlite::params;

use crate::codec::parsed;
use crate::database::{Database, map_tr_err};
use crate::models::SpendingLimit;

/// Insert or replace a user's spending limit.
pub async fn save_spending_limit(db: &Database, limit: &SpendingLimit) -> Result<(), IndexerError> {
    let limit = limit.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO spending_limits (id, user, allowance, expires_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                     user = excluded.user,
                     allowance = excluded.allowance,
                     expires_at = excluded.expires_at,
                     updated_at = excluded.updated_at",
                params![
                    limit.id,
                    address_key(&limit.user),
                    limit.allowance.to_string(),
                    limit.expires_at.to_string(),
                    limit.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a spending limit by key.
pub async fn get_spending_limit(
    db: &Database,
    id: &str,
) -> Result<Option<SpendingLimit>, IndexerError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user, allowance, expires_at, updated_at
                 FROM spending_limits WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], |row| {
                Ok(SpendingLimit {
                    id: row.get(0)?,
                    user: parsed(row, 1)?,
                    allowance: parsed(row, 2)?,
                    expires_at: parsed(row, 3)?,
                    updated_at: row.get(4)?,
                })
            });
            match result {
                Ok(limit) => Ok(Some(limit)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a spending limit. Returns true if a row was removed.
pub async fn delete_spending_limit(db: &Database, id: &str) -> Result<bool, IndexerError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let rows = conn.execute("DELETE FROM spending_limits WHERE id = ?1", params![id])?;
            Ok(rows > 0)
        })
        .await
        .map_err(map_tr_err)
}
