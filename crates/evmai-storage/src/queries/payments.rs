// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment load/save operations.

use evmai_core::{IndexerError, address_key};
use rusqlite::params;

use crate::codec::parsed;
use crate::database::{Database, map_tr_err};
use crate::models::Payment;

/// Insert or replace a payment.
pub async fn save_payment(db: &Database, payment: &Payment) -> Result<(), IndexerError> {
    let payment = payment.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO payments (id, user, amount, status, created_at, finalized_at, transaction_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                     user = excluded.user,
                     amount = excluded.amount,
                     status = excluded.status,
                     created_at = excluded.created_at,
                     finalized_at = excluded.finalized_at,
                     transaction_hash = excluded.transaction_hash",
                params![
                    payment.id,
                    address_key(&payment.user),
                    payment.amount.to_string(),
                    payment.status.to_string(),
                    payment.created_at,
                    payment.finalized_at,
                    payment.transaction_hash,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a payment by escrow id.
pub async fn get_payment(db: &Database, id: &str) -> Result<Option<Payment>, IndexerError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user, amount, status, created_at, finalized_at, transaction_hash
                 FROM payments WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], |row| {
                Ok(Payment {
                    id: row.get(0)?,
                    user: parsed(row, 1)?,
                    amount: parsed(row, 2)?,
                    status: parsed(row, 3)?,
                    created_at: row.get(4)?,
                    finalized_at: row.get(5)?,
                    transaction_hash: row.get(6)?,
                })
            });
            match result {
                Ok(payment) => Ok(Some(payment)),
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
    use crate::models::PaymentStatus;
    use alloy_primitives::{Address, U256};

    #[tokio::test]
    async fn payment_amount_survives_full_width() {
        let db = Database::open_in_memory().await.unwrap();
        let payment = Payment {
            id: "7".to_string(),
            user: Address::repeat_byte(0xab),
            amount: U256::MAX,
            status: PaymentStatus::Pending,
            created_at: 100,
            finalized_at: None,
            transaction_hash: "0x07".to_string(),
        };
        save_payment(&db, &payment).await.unwrap();
        assert_eq!(get_payment(&db, "7").await.unwrap(), Some(payment));
    }

    #[tokio::test]
    async fn status_update_replaces_row() {
        let db = Database::open_in_memory().await.unwrap();
        let mut payment = Payment {
            id: "7".to_string(),
            user: Address::repeat_byte(0xab),
            amount: U256::from(500u64),
            status: PaymentStatus::Pending,
            created_at: 100,
            finalized_at: None,
            transaction_hash: "0x07".to_string(),
        };
        save_payment(&db, &payment).await.unwrap();
        payment.status = PaymentStatus::Complete;
        payment.finalized_at = Some(130);
        save_payment(&db, &payment).await.unwrap();

        let loaded = get_payment(&db, "7").await.unwrap().unwrap();
        assert_eq!(loaded.status, PaymentStatus::Complete);
        assert_eq!(loaded.finalized_at, Some(130));
    }
}
