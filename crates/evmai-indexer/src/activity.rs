// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Write-once activity ledger.
//!
//! Rows are keyed by `{transactionHash}-{logIndex}`, which is unique even when
//! one transaction emits several qualifying events and identical on replay.

use std::sync::Arc;

use alloy_primitives::{Address, I256, Sign, U256};
use tracing::{debug, info};

use evmai_core::{Activity, ActivityType, EntityStore, EventContext, IndexerError};

/// Ledger key of the row an event produces.
pub fn activity_key(context: &EventContext) -> String {
    format!("{}-{}", context.transaction_hash_hex(), context.log_index)
}

/// Signed ledger amount for a debit of `amount`.
pub fn debit(amount: U256) -> Result<I256, IndexerError> {
    signed(Sign::Negative, amount)
}

/// Signed ledger amount for a credit of `amount`.
pub fn credit(amount: U256) -> Result<I256, IndexerError> {
    signed(Sign::Positive, amount)
}

fn signed(sign: Sign, amount: U256) -> Result<I256, IndexerError> {
    I256::checked_from_sign_and_abs(sign, amount).ok_or_else(|| IndexerError::Decode {
        message: format!("amount {amount} does not fit a signed ledger entry"),
    })
}

/// Appends activity rows derived from events.
#[derive(Clone)]
pub struct ActivityLedger {
    store: Arc<dyn EntityStore>,
}

impl ActivityLedger {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Whether the row for this event has already been written.
    pub async fn is_recorded(&self, context: &EventContext) -> Result<bool, IndexerError> {
        Ok(self.store.load_activity(&activity_key(context)).await?.is_some())
    }

    /// Record one ledger row for the event.
    ///
    /// Returns false when the row already existed; the stored row is kept.
    pub async fn record(
        &self,
        context: &EventContext,
        user: Address,
        activity_type: ActivityType,
        amount: I256,
    ) -> Result<bool, IndexerError> {
        let activity = Activity {
            id: activity_key(context),
            user,
            activity_type,
            amount,
            timestamp: context.block_timestamp,
            transaction_hash: context.transaction_hash_hex(),
        };

        let inserted = self.store.insert_activity(&activity).await?;
        if inserted {
            info!(
                id = %activity.id,
                user = %activity.user,
                activity_type = %activity.activity_type,
                amount = %activity.amount,
                "activity recorded"
            );
        } else {
            debug!(id = %activity.id, "activity already recorded");
        }
        Ok(inserted)
    }
}
