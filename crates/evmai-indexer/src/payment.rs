// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reducer for escrow payments, spending limits and fee activity.
//!
//! Fee amounts are not carried by the events; they are read from contract
//! state at the block of the triggering event so that a replay reads the
//! same value.

use std::sync::Arc;

use alloy_primitives::{Address, I256, U256};
use tracing::debug;

use evmai_core::methods::{
    BRANCH_FEE, CANCELLATION_FEE, ContractMethod, ESCROW_CONTRACT, METADATA_UPDATE_FEE,
};
use evmai_core::{
    ActivityType, ChainReader, EntityStore, EventContext, IndexerError, Payment, PaymentStatus,
    SpendingLimit, address_key, id_key,
};

use crate::activity::{ActivityLedger, credit, debit};
use crate::reconcile;

/// Agent-side requests that the escrow contract charges a fee for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentFee {
    Branch,
    MetadataUpdate,
}

impl AgentFee {
    fn method(self) -> ContractMethod {
        match self {
            Self::Branch => BRANCH_FEE,
            Self::MetadataUpdate => METADATA_UPDATE_FEE,
        }
    }

    fn activity_type(self) -> ActivityType {
        match self {
            Self::Branch => ActivityType::BranchFee,
            Self::MetadataUpdate => ActivityType::MetadataUpdateFee,
        }
    }
}

/// Applies escrow-contract events and the fee-bearing agent requests.
#[derive(Clone)]
pub struct PaymentReducer {
    store: Arc<dyn EntityStore>,
    chain: Arc<dyn ChainReader>,
    ledger: ActivityLedger,
}

impl PaymentReducer {
    pub fn new(store: Arc<dyn EntityStore>, chain: Arc<dyn ChainReader>) -> Self {
        let ledger = ActivityLedger::new(store.clone());
        Self {
            store,
            chain,
            ledger,
        }
    }

    /// PaymentEscrowed: a pending payment plus a conversation-spend debit.
    pub async fn payment_escrowed(
        &self,
        context: &EventContext,
        escrow_id: &U256,
        user: Address,
        amount: U256,
    ) -> Result<(), IndexerError> {
        let mut payment = Payment {
            id: id_key(escrow_id),
            user,
            amount,
            status: PaymentStatus::Pending,
            created_at: context.block_timestamp,
            finalized_at: None,
            transaction_hash: context.transaction_hash_hex(),
        };
        if let Some(existing) = self.store.load_payment(&payment.id).await? {
            if existing.status.is_terminal() {
                debug!(
                    payment = %payment.id,
                    status = %existing.status,
                    "payment escrowed again after resolution, keeping status"
                );
                payment.status = existing.status;
                payment.finalized_at = existing.finalized_at;
            }
        }
        self.store.save_payment(&payment).await?;

        self.ledger
            .record(context, user, ActivityType::ConversationSpend, debit(amount)?)
            .await?;
        Ok(())
    }

    /// PaymentFinalized: PENDING becomes COMPLETE.
    pub async fn payment_finalized(
        &self,
        context: &EventContext,
        escrow_id: &U256,
    ) -> Result<(), IndexerError> {
        let key = id_key(escrow_id);
        match self.store.load_payment(&key).await? {
            Some(mut payment) if payment.status == PaymentStatus::Pending => {
                payment.status = PaymentStatus::Complete;
                payment.finalized_at = Some(context.block_timestamp);
                self.store.save_payment(&payment).await
            }
            Some(payment) => {
                debug!(
                    payment = %key,
                    status = %payment.status,
                    "finalize of resolved payment skipped"
                );
                Ok(())
            }
            None => {
                debug!(payment = %key, "finalize of unindexed payment skipped");
                Ok(())
            }
        }
    }

    /// PaymentRefunded: refund the payment and flag the prompt request that
    /// shares its id. Each side proceeds when the other is missing.
    pub async fn payment_refunded(
        &self,
        context: &EventContext,
        escrow_id: &U256,
    ) -> Result<(), IndexerError> {
        let key = id_key(escrow_id);
        match self.store.load_payment(&key).await? {
            Some(payment) if payment.status.is_terminal() => {
                debug!(
                    payment = %key,
                    status = %payment.status,
                    "refund of resolved payment skipped"
                );
            }
            Some(mut payment) => {
                // Ledger first: a crash before the status write is repaired by redelivery.
                self.ledger
                    .record(context, payment.user, ActivityType::Refund, credit(payment.amount)?)
                    .await?;
                payment.status = PaymentStatus::Refunded;
                payment.finalized_at = Some(context.block_timestamp);
                self.store.save_payment(&payment).await?;
            }
            None => {
                debug!(payment = %key, "refund of unindexed payment skipped");
            }
        }

        reconcile::mark_prompt_refunded(self.store.as_ref(), &key, context.block_timestamp)
            .await?;
        Ok(())
    }

    /// SpendingLimitSet: replace the user's limit.
    pub async fn spending_limit_set(
        &self,
        context: &EventContext,
        user: Address,
        allowance: U256,
        expires_at: U256,
    ) -> Result<(), IndexerError> {
        let limit = SpendingLimit {
            id: address_key(&user),
            user,
            allowance,
            expires_at,
            updated_at: context.block_timestamp,
        };
        self.store.save_spending_limit(&limit).await?;
        self.ledger
            .record(context, user, ActivityType::PlanUpdate, I256::ZERO)
            .await?;
        Ok(())
    }

    /// SpendingLimitCancelled: drop the user's limit if there is one.
    pub async fn spending_limit_cancelled(
        &self,
        context: &EventContext,
        user: Address,
    ) -> Result<(), IndexerError> {
        let key = address_key(&user);
        if !self.store.delete_spending_limit(&key).await? {
            debug!(spending_limit = %key, "no spending limit to cancel");
        }
        self.ledger
            .record(context, user, ActivityType::PlanRevoke, I256::ZERO)
            .await?;
        Ok(())
    }

    /// PromptCancelled on the escrow contract: charge the cancellation fee.
    pub async fn cancellation_fee_charged(
        &self,
        context: &EventContext,
        user: Address,
    ) -> Result<(), IndexerError> {
        if self.ledger.is_recorded(context).await? {
            debug!(block = context.block_number, "cancellation fee already recorded");
            return Ok(());
        }
        let fee = self
            .chain
            .read_scalar(context.contract, CANCELLATION_FEE, context.block_number)
            .await?;
        self.ledger
            .record(context, user, ActivityType::CancellationFee, debit(fee)?)
            .await?;
        Ok(())
    }

    /// BranchRequested and MetadataUpdateRequested on the agent contract.
    ///
    /// The fee lives on the escrow contract the agent points at.
    pub async fn agent_fee_charged(
        &self,
        context: &EventContext,
        user: Address,
        fee: AgentFee,
    ) -> Result<(), IndexerError> {
        if self.ledger.is_recorded(context).await? {
            debug!(block = context.block_number, ?fee, "agent fee already recorded");
            return Ok(());
        }
        let escrow = self
            .chain
            .read_address(context.contract, ESCROW_CONTRACT, context.block_number)
            .await?;
        let amount = self
            .chain
            .read_scalar(escrow, fee.method(), context.block_number)
            .await?;
        self.ledger
            .record(context, user, fee.activity_type(), debit(amount)?)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;
    use evmai_test_utils::{AGENT, ESCROW, MemoryStore, MockChainReader, USER};

    fn context(contract: Address, block: u64, log_index: u64) -> EventContext {
        EventContext {
            block_number: block,
            block_timestamp: block * 10,
            transaction_hash: B256::repeat_byte(block as u8),
            transaction_index: 0,
            log_index,
            contract,
        }
    }

    fn setup() -> (Arc<MemoryStore>, Arc<MockChainReader>, PaymentReducer) {
        let store = Arc::new(MemoryStore::new());
        let chain = Arc::new(MockChainReader::new());
        let reducer = PaymentReducer::new(store.clone(), chain.clone());
        (store, chain, reducer)
    }

    #[tokio::test]
    async fn finalize_only_applies_to_pending() {
        let (store, _chain, reducer) = setup();
        let id = U256::from(7u64);
        reducer
            .payment_escrowed(&context(ESCROW, 1, 0), &id, USER, U256::from(100u64))
            .await
            .unwrap();
        reducer
            .payment_finalized(&context(ESCROW, 2, 0), &id)
            .await
            .unwrap();
        reducer
            .payment_finalized(&context(ESCROW, 3, 0), &id)
            .await
            .unwrap();

        let payment = store.snapshot().await.payments["7"].clone();
        assert_eq!(payment.status, PaymentStatus::Complete);
        assert_eq!(payment.finalized_at, Some(20));
    }

    #[tokio::test]
    async fn refund_after_completion_is_ignored() {
        let (store, _chain, reducer) = setup();
        let id = U256::from(7u64);
        reducer
            .payment_escrowed(&context(ESCROW, 1, 0), &id, USER, U256::from(100u64))
            .await
            .unwrap();
        reducer
            .payment_finalized(&context(ESCROW, 2, 0), &id)
            .await
            .unwrap();
        reducer
            .payment_refunded(&context(ESCROW, 3, 0), &id)
            .await
            .unwrap();

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.payments["7"].status, PaymentStatus::Complete);
        assert!(
            snapshot
                .activities
                .iter()
                .all(|a| a.activity_type != ActivityType::Refund)
        );
    }

    #[tokio::test]
    async fn second_refund_credits_once() {
        let (store, _chain, reducer) = setup();
        let id = U256::from(11u64);
        reducer
            .payment_escrowed(&context(ESCROW, 12, 0), &id, USER, U256::from(500u64))
            .await
            .unwrap();
        reducer
            .payment_refunded(&context(ESCROW, 13, 0), &id)
            .await
            .unwrap();
        reducer
            .payment_refunded(&context(ESCROW, 14, 0), &id)
            .await
            .unwrap();

        let snapshot = store.snapshot().await;
        let refunds: Vec<I256> = snapshot
            .activities
            .iter()
            .filter(|a| a.activity_type == ActivityType::Refund)
            .map(|a| a.amount)
            .collect();
        assert_eq!(refunds, vec![I256::from_dec_str("500").unwrap()]);
        let payment = &snapshot.payments["11"];
        assert_eq!(payment.status, PaymentStatus::Refunded);
        assert_eq!(payment.finalized_at, Some(130));
    }

    #[tokio::test]
    async fn cancelling_absent_limit_still_records_revoke() {
        let (store, _chain, reducer) = setup();
        reducer
            .spending_limit_cancelled(&context(ESCROW, 1, 0), USER)
            .await
            .unwrap();
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.activities.len(), 1);
        assert_eq!(snapshot.activities[0].activity_type, ActivityType::PlanRevoke);
        assert_eq!(snapshot.activities[0].amount, I256::ZERO);
    }

    #[tokio::test]
    async fn cancellation_fee_is_read_at_event_block_from_emitting_escrow() {
        let (store, chain, reducer) = setup();
        chain
            .set_scalar_at(ESCROW, CANCELLATION_FEE, 4, U256::from(25u64))
            .await;
        reducer
            .cancellation_fee_charged(&context(ESCROW, 4, 1), USER)
            .await
            .unwrap();

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.activities[0].activity_type, ActivityType::CancellationFee);
        assert_eq!(snapshot.activities[0].amount, I256::from_dec_str("-25").unwrap());
        assert_eq!(chain.reads().await[0].block, 4);
    }

    #[tokio::test]
    async fn branch_fee_resolves_escrow_through_agent() {
        let (store, chain, reducer) = setup();
        chain.set_address(AGENT, ESCROW_CONTRACT, ESCROW).await;
        chain.set_scalar(ESCROW, BRANCH_FEE, U256::from(40u64)).await;

        reducer
            .agent_fee_charged(&context(AGENT, 6, 2), USER, AgentFee::Branch)
            .await
            .unwrap();

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.activities[0].activity_type, ActivityType::BranchFee);
        assert_eq!(snapshot.activities[0].amount, I256::from_dec_str("-40").unwrap());
        let reads = chain.reads().await;
        assert_eq!(reads[0].contract, AGENT);
        assert_eq!(reads[1].contract, ESCROW);
        assert!(reads.iter().all(|r| r.block == 6));
    }

    #[tokio::test]
    async fn recorded_fee_is_not_read_again() {
        let (store, chain, reducer) = setup();
        chain.set_address(AGENT, ESCROW_CONTRACT, ESCROW).await;
        chain
            .set_scalar(ESCROW, METADATA_UPDATE_FEE, U256::from(5u64))
            .await;
        let ctx = context(AGENT, 8, 0);

        reducer
            .agent_fee_charged(&ctx, USER, AgentFee::MetadataUpdate)
            .await
            .unwrap();
        chain.fail(AGENT, ESCROW_CONTRACT).await;
        reducer
            .agent_fee_charged(&ctx, USER, AgentFee::MetadataUpdate)
            .await
            .unwrap();

        assert_eq!(store.snapshot().await.activities.len(), 1);
        assert_eq!(chain.reads().await.len(), 2);
    }

    #[tokio::test]
    async fn failed_fee_read_writes_nothing() {
        let (store, chain, reducer) = setup();
        chain.fail(ESCROW, CANCELLATION_FEE).await;
        let err = reducer
            .cancellation_fee_charged(&context(ESCROW, 4, 0), USER)
            .await
            .unwrap_err();
        assert!(matches!(err, IndexerError::ChainRead { .. }));
        assert!(store.snapshot().await.activities.is_empty());
    }
}
