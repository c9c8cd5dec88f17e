// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for ordered chain events.

use alloy_primitives::{Address, B256, Bytes, U256, address};

use evmai_core::{AgentEvent, ChainEvent, EscrowEvent, EventContext, EventPayload};

/// Agent contract address used across tests.
pub const AGENT: Address = address!("0x1111111111111111111111111111111111111111");

/// Escrow contract address used across tests.
pub const ESCROW: Address = address!("0x2222222222222222222222222222222222222222");

/// Default requester.
pub const USER: Address = address!("0x00000000000000000000000000000000000000aa");

/// A second requester for isolation checks.
pub const OTHER_USER: Address = address!("0x00000000000000000000000000000000000000bb");

/// Produces events with strictly increasing positions.
///
/// Each event lands in its own transaction at the block given by its
/// timestamp, unless [`EventFactory::same_transaction`] groups several logs
/// into one.
#[derive(Debug, Clone)]
pub struct EventFactory {
    agent: Address,
    escrow: Address,
    last_block: u64,
    transaction_index: u64,
    log_index: u64,
    grouped: bool,
}

impl Default for EventFactory {
    fn default() -> Self {
        Self::new(AGENT, ESCROW)
    }
}

impl EventFactory {
    pub fn new(agent: Address, escrow: Address) -> Self {
        Self {
            agent,
            escrow,
            last_block: 0,
            transaction_index: 0,
            log_index: 0,
            grouped: false,
        }
    }

    /// Emit the following events as logs of a single transaction until
    /// [`EventFactory::separate_transactions`] is called.
    pub fn same_transaction(&mut self) -> &mut Self {
        self.grouped = true;
        self.transaction_index += 1;
        self
    }

    pub fn separate_transactions(&mut self) -> &mut Self {
        self.grouped = false;
        self
    }

    /// Event from the agent contract at block `timestamp`.
    pub fn agent(&mut self, timestamp: u64, event: AgentEvent) -> ChainEvent {
        let context = self.next_context(timestamp, self.agent);
        ChainEvent {
            context,
            payload: EventPayload::Agent(event),
        }
    }

    /// Event from the escrow contract at block `timestamp`.
    pub fn escrow(&mut self, timestamp: u64, event: EscrowEvent) -> ChainEvent {
        let context = self.next_context(timestamp, self.escrow);
        ChainEvent {
            context,
            payload: EventPayload::Escrow(event),
        }
    }

    fn next_context(&mut self, timestamp: u64, contract: Address) -> EventContext {
        let block = timestamp.max(self.last_block);
        if block != self.last_block {
            self.last_block = block;
            self.transaction_index = 0;
            self.log_index = 0;
        } else if !self.grouped {
            self.transaction_index += 1;
        }
        let context = EventContext {
            block_number: block,
            block_timestamp: timestamp,
            transaction_hash: transaction_hash(block, self.transaction_index),
            transaction_index: self.transaction_index,
            log_index: self.log_index,
            contract,
        };
        self.log_index += 1;
        context
    }
}

fn transaction_hash(block: u64, transaction_index: u64) -> B256 {
    let word = U256::from(block) << 64usize
        | U256::from(transaction_index)
        | U256::from(1u64) << 255usize;
    B256::from(word.to_be_bytes::<32>())
}

// --- Payload shorthands ---

pub fn conversation_added(user: Address, id: u64, cid: &str, metadata_cid: &str) -> AgentEvent {
    AgentEvent::ConversationAdded {
        user,
        conversation_id: U256::from(id),
        conversation_cid: cid.to_string(),
        metadata_cid: metadata_cid.to_string(),
    }
}

pub fn conversation_branched(user: Address, original: u64, id: u64, cid: &str) -> AgentEvent {
    AgentEvent::ConversationBranched {
        user,
        original_conversation_id: U256::from(original),
        new_conversation_id: U256::from(id),
        conversation_cid: cid.to_string(),
        metadata_cid: format!("{cid}-meta"),
    }
}

pub fn prompt_message(conversation: u64, message: u64, cid: &str) -> AgentEvent {
    AgentEvent::PromptMessageAdded {
        conversation_id: U256::from(conversation),
        message_id: U256::from(message),
        message_cid: cid.to_string(),
    }
}

pub fn answer_message(conversation: u64, message: u64, cid: &str) -> AgentEvent {
    AgentEvent::AnswerMessageAdded {
        conversation_id: U256::from(conversation),
        message_id: U256::from(message),
        message_cid: cid.to_string(),
    }
}

pub fn search_delta(conversation: u64, message: u64, cid: &str) -> AgentEvent {
    AgentEvent::SearchIndexDeltaAdded {
        conversation_id: U256::from(conversation),
        message_id: U256::from(message),
        search_delta_cid: cid.to_string(),
    }
}

pub fn metadata_updated(conversation: u64, cid: &str) -> AgentEvent {
    AgentEvent::ConversationMetadataUpdated {
        conversation_id: U256::from(conversation),
        new_metadata_cid: cid.to_string(),
    }
}

pub fn prompt_submitted(user: Address, conversation: u64, prompt: u64, answer: u64) -> AgentEvent {
    AgentEvent::PromptSubmitted {
        user,
        conversation_id: U256::from(conversation),
        prompt_message_id: U256::from(prompt),
        answer_message_id: U256::from(answer),
        encrypted_payload: Bytes::from_static(b"\x01\x02sealed"),
    }
}

pub fn agent_prompt_cancelled(user: Address, answer: u64) -> AgentEvent {
    AgentEvent::PromptCancelled {
        user,
        answer_message_id: U256::from(answer),
    }
}

pub fn branch_requested(user: Address, original: u64) -> AgentEvent {
    AgentEvent::BranchRequested {
        user,
        original_conversation_id: U256::from(original),
    }
}

pub fn metadata_update_requested(user: Address, conversation: u64) -> AgentEvent {
    AgentEvent::MetadataUpdateRequested {
        user,
        conversation_id: U256::from(conversation),
    }
}

pub fn payment_escrowed(escrow_id: u64, user: Address, amount: u64) -> EscrowEvent {
    EscrowEvent::PaymentEscrowed {
        escrow_id: U256::from(escrow_id),
        user,
        amount: U256::from(amount),
    }
}

pub fn payment_finalized(escrow_id: u64) -> EscrowEvent {
    EscrowEvent::PaymentFinalized {
        escrow_id: U256::from(escrow_id),
    }
}

pub fn payment_refunded(escrow_id: u64) -> EscrowEvent {
    EscrowEvent::PaymentRefunded {
        escrow_id: U256::from(escrow_id),
    }
}

pub fn spending_limit_set(user: Address, allowance: u64, expires_at: u64) -> EscrowEvent {
    EscrowEvent::SpendingLimitSet {
        user,
        allowance: U256::from(allowance),
        expires_at: U256::from(expires_at),
    }
}

pub fn spending_limit_cancelled(user: Address) -> EscrowEvent {
    EscrowEvent::SpendingLimitCancelled { user }
}

pub fn escrow_prompt_cancelled(user: Address, answer: u64) -> EscrowEvent {
    EscrowEvent::PromptCancelled {
        user,
        answer_message_id: U256::from(answer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_strictly_increase() {
        let mut factory = EventFactory::default();
        let a = factory.agent(100, conversation_added(USER, 1, "A", "B"));
        let b = factory.agent(100, prompt_message(1, 10, "C"));
        let c = factory.escrow(99, payment_finalized(1));
        let d = factory.agent(110, prompt_message(1, 11, "D"));
        assert!(a.position() < b.position());
        assert!(b.position() < c.position());
        assert!(c.position() < d.position());
        assert_ne!(a.context.transaction_hash, b.context.transaction_hash);
    }

    #[test]
    fn grouped_logs_share_a_transaction() {
        let mut factory = EventFactory::default();
        factory.agent(100, conversation_added(USER, 1, "A", "B"));
        factory.same_transaction();
        let a = factory.escrow(100, payment_escrowed(11, USER, 5));
        let b = factory.agent(100, prompt_submitted(USER, 1, 10, 11));
        factory.separate_transactions();
        assert_eq!(a.context.transaction_hash, b.context.transaction_hash);
        assert!(a.context.log_index < b.context.log_index);
    }
}
