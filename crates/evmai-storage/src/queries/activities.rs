// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Activity ledger persistence.
//!
//! Rows are write-once: a second insert for the same key is ignored so that
//! replaying a log never rewrites the amount or timestamp recorded the first
//! time.

use alloy_primitives::Address;
use evmai_core::{IndexerError, address_key};
use rusqlite::{Row, params};

use crate::codec::parsed;
use crate::database::{Database, map_tr_err};
use crate::models::Activity;

fn from_row(row: &Row<'_>) -> rusqlite::Result<Activity> {
    Ok(Activity {
        id: row.get(0)?,
        user: parsed(row, 1)?,
        activity_type: parsed(row, 2)?,
        amount: parsed(row, 3)?,
        timestamp: row.get(4)?,
        transaction_hash: row.get(5)?,
    })
}

/// Insert an activity row unless its key exists. Returns true if inserted.
pub async fn insert_activity(db: &Database, activity: &Activity) -> Result<bool, IndexerError> {
    let activity = activity.clone();
    db.connection()
        .call(move |conn| {
            let rows = conn.execute(
                "INSERT INTO activities (id, user, activity_type, amount, timestamp, transaction_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO NOTHING",
                params![
                    activity.id,
                    address_key(&activity.user),
                    activity.activity_type.to_string(),
                    activity.amount.to_string(),
                    activity.timestamp,
                    activity.transaction_hash,
                ],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Get an activity row by key.
pub async fn get_activity(db: &Database, id: &str) -> Result<Option<Activity>, IndexerError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user, activity_type, amount, timestamp, transaction_hash
                 FROM activities WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], from_row);
            match result {
                Ok(activity) => Ok(Some(activity)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// All activity rows for a user, oldest first.
pub async fn list_activities_for_user(
    db: &Database,
    user: &Address,
) -> Result<Vec<Activity>, IndexerError> {
    let user = address_key(user);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user, activity_type, amount, timestamp, transaction_hash
                 FROM activities WHERE user = ?1
                 ORDER BY timestamp ASC, rowid ASC",
            )?;
            let rows = stmt.query_map(params![user], from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
