// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event dispatcher and run loop.
//!
//! Events are handled strictly one at a time: each handler is awaited to
//! completion before the next event is pulled, so load-mutate-save sequences
//! never interleave.

use std::sync::Arc;

use alloy_primitives::Address;
use tracing::{Instrument, debug, info, info_span};

use evmai_config::ContractAddresses;
use evmai_core::{
    AgentEvent, ChainEvent, ChainReader, ContractKind, EntityStore, EscrowEvent, EventPayload,
    EventPosition, EventSource, IndexerCursor, IndexerError, MessageRole,
};

use crate::conversation::ConversationReducer;
use crate::payment::{AgentFee, PaymentReducer};

/// The two contracts whose events are indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractRegistry {
    agent: Address,
    escrow: Address,
}

impl ContractRegistry {
    pub fn new(agent: Address, escrow: Address) -> Self {
        Self { agent, escrow }
    }

    pub fn agent(&self) -> Address {
        self.agent
    }

    pub fn escrow(&self) -> Address {
        self.escrow
    }

    /// Kind of the contract at `address`, if it is registered.
    pub fn kind_of(&self, address: &Address) -> Option<ContractKind> {
        if *address == self.agent {
            Some(ContractKind::Agent)
        } else if *address == self.escrow {
            Some(ContractKind::Escrow)
        } else {
            None
        }
    }
}

impl From<ContractAddresses> for ContractRegistry {
    fn from(addresses: ContractAddresses) -> Self {
        Self::new(addresses.agent, addresses.escrow)
    }
}

/// Where a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Skip events at or before the stored cursor.
    #[default]
    Resume,
    /// Handle every event from the start of the feed.
    Replay,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Events passed to a handler.
    pub handled: u64,
    /// Events at or before the resume cursor.
    pub skipped: u64,
    /// Position of the last handled event.
    pub last_position: Option<EventPosition>,
}

/// Routes events to the reducers and tracks progress.
pub struct Indexer {
    store: Arc<dyn EntityStore>,
    registry: ContractRegistry,
    conversations: ConversationReducer,
    payments: PaymentReducer,
}

impl Indexer {
    pub fn new(
        store: Arc<dyn EntityStore>,
        chain: Arc<dyn ChainReader>,
        registry: ContractRegistry,
    ) -> Self {
        Self {
            conversations: ConversationReducer::new(store.clone()),
            payments: PaymentReducer::new(store.clone(), chain),
            store,
            registry,
        }
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    /// Handle a single event.
    ///
    /// The emitting contract must be registered with the kind the payload
    /// belongs to.
    pub async fn handle(&self, event: &ChainEvent) -> Result<(), IndexerError> {
        let context = &event.context;
        let span = info_span!(
            "event",
            kind = event.payload.name(),
            block = context.block_number,
            tx = context.transaction_index,
            log = context.log_index,
        );
        async {
            let found = event.payload.contract_kind();
            match self.registry.kind_of(&context.contract) {
                None => {
                    return Err(IndexerError::UnknownContract {
                        address: context.contract,
                    });
                }
                Some(expected) if expected != found => {
                    return Err(IndexerError::ContractMismatch {
                        address: context.contract,
                        expected,
                        found,
                    });
                }
                Some(_) => {}
            }

            match &event.payload {
                EventPayload::Agent(agent) => self.handle_agent(event, agent).await,
                EventPayload::Escrow(escrow) => self.handle_escrow(event, escrow).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn handle_agent(
        &self,
        event: &ChainEvent,
        agent: &AgentEvent,
    ) -> Result<(), IndexerError> {
        let context = &event.context;
        let conversations = &self.conversations;
        match agent {
            AgentEvent::ConversationAdded {
                user,
                conversation_id,
                conversation_cid,
                metadata_cid,
            } => {
                conversations
                    .conversation_added(
                        context,
                        *user,
                        conversation_id,
                        conversation_cid,
                        metadata_cid,
                    )
                    .await
            }
            AgentEvent::ConversationBranched {
                user,
                original_conversation_id,
                new_conversation_id,
                conversation_cid,
                metadata_cid,
            } => {
                conversations
                    .conversation_branched(
                        context,
                        *user,
                        original_conversation_id,
                        new_conversation_id,
                        conversation_cid,
                        metadata_cid,
                    )
                    .await
            }
            AgentEvent::PromptMessageAdded {
                conversation_id,
                message_id,
                message_cid,
            } => {
                conversations
                    .message_added(
                        context,
                        conversation_id,
                        message_id,
                        message_cid,
                        MessageRole::User,
                    )
                    .await
            }
            AgentEvent::AnswerMessageAdded {
                conversation_id,
                message_id,
                message_cid,
            } => {
                conversations
                    .message_added(
                        context,
                        conversation_id,
                        message_id,
                        message_cid,
                        MessageRole::Assistant,
                    )
                    .await
            }
            AgentEvent::SearchIndexDeltaAdded {
                message_id,
                search_delta_cid,
                ..
            } => conversations.search_delta_added(message_id, search_delta_cid).await,
            AgentEvent::ConversationMetadataUpdated {
                conversation_id,
                new_metadata_cid,
            } => {
                conversations
                    .metadata_updated(context, conversation_id, new_metadata_cid)
                    .await
            }
            AgentEvent::PromptSubmitted {
                user,
                conversation_id,
                prompt_message_id,
                answer_message_id,
                encrypted_payload,
            } => {
                conversations
                    .prompt_submitted(
                        context,
                        *user,
                        conversation_id,
                        prompt_message_id,
                        answer_message_id,
                        encrypted_payload,
                    )
                    .await
            }
            AgentEvent::PromptCancelled {
                answer_message_id, ..
            } => conversations.prompt_cancelled(context, answer_message_id).await,
            AgentEvent::BranchRequested { user, .. } => {
                self.payments
                    .agent_fee_charged(context, *user, AgentFee::Branch)
                    .await
            }
            AgentEvent::MetadataUpdateRequested { user, .. } => {
                self.payments
                    .agent_fee_charged(context, *user, AgentFee::MetadataUpdate)
                    .await
            }
        }
    }

    async fn handle_escrow(
        &self,
        event: &ChainEvent,
        escrow: &EscrowEvent,
    ) -> Result<(), IndexerError> {
        let context = &event.context;
        let payments = &self.payments;
        match escrow {
            EscrowEvent::PaymentEscrowed {
                escrow_id,
                user,
                amount,
            } => {
                payments
                    .payment_escrowed(context, escrow_id, *user, *amount)
                    .await
            }
            EscrowEvent::PaymentFinalized { escrow_id } => {
                payments.payment_finalized(context, escrow_id).await
            }
            EscrowEvent::PaymentRefunded { escrow_id } => {
                payments.payment_refunded(context, escrow_id).await
            }
            EscrowEvent::SpendingLimitSet {
                user,
                allowance,
                expires_at,
            } => {
                payments
                    .spending_limit_set(context, *user, *allowance, *expires_at)
                    .await
            }
            EscrowEvent::SpendingLimitCancelled { user } => {
                payments.spending_limit_cancelled(context, *user).await
            }
            EscrowEvent::PromptCancelled { user, .. } => {
                payments.cancellation_fee_charged(context, *user).await
            }
        }
    }

    /// Drain `source`, handling events in order and saving the cursor after
    /// each one.
    ///
    /// Stops at the first error; the cursor then still points at the last
    /// event that was fully handled.
    pub async fn run(
        &self,
        source: &mut dyn EventSource,
        mode: RunMode,
    ) -> Result<RunSummary, IndexerError> {
        let resume_after = match mode {
            RunMode::Resume => self.store.load_cursor().await?.map(|cursor| cursor.position),
            RunMode::Replay => None,
        };
        if let Some(position) = resume_after {
            info!(%position, "resuming after stored cursor");
        }

        let mut summary = RunSummary::default();
        let mut previous: Option<EventPosition> = None;

        while let Some(event) = source.next_event().await? {
            let position = event.position();
            if let Some(previous) = previous {
                if position < previous {
                    return Err(IndexerError::OutOfOrder {
                        previous,
                        current: position,
                    });
                }
            }
            previous = Some(position);

            if resume_after.is_some_and(|cursor| position <= cursor) {
                debug!(%position, "event at or before cursor skipped");
                summary.skipped += 1;
                continue;
            }

            self.handle(&event).await?;
            self.store
                .save_cursor(&IndexerCursor {
                    position,
                    updated_at: now_secs(),
                })
                .await?;
            summary.handled += 1;
            summary.last_position = Some(position);
        }

        info!(
            handled = summary.handled,
            skipped = summary.skipped,
            last_position = ?summary.last_position,
            "event feed drained"
        );
        Ok(summary)
    }
}

fn now_secs() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}
