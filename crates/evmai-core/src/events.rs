// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoded contract events as delivered by the upstream log.
//!
//! Each event kind maps to one strongly-typed variant so that reducers never
//! look up payload fields by name. Variants are grouped by the contract family
//! that emits them; the dispatcher checks that family against the address
//! registered for the emitting contract.

use std::fmt;

use alloy_primitives::{Address, B256, Bytes, U256};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// The contract families the indexer understands.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    Agent,
    Escrow,
}

/// Total order of events in the chain log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventPosition {
    pub block_number: u64,
    pub transaction_index: u64,
    pub log_index: u64,
}

impl fmt::Display for EventPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.block_number, self.transaction_index, self.log_index
        )
    }
}

/// Block, transaction, and log metadata bound to every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    pub block_number: u64,
    /// Block timestamp in seconds.
    pub block_timestamp: u64,
    pub transaction_hash: B256,
    pub transaction_index: u64,
    pub log_index: u64,
    /// Address of the emitting contract.
    pub contract: Address,
}

impl EventContext {
    pub fn position(&self) -> EventPosition {
        EventPosition {
            block_number: self.block_number,
            transaction_index: self.transaction_index,
            log_index: self.log_index,
        }
    }

    /// Transaction hash as 0x-prefixed lowercase hex.
    pub fn transaction_hash_hex(&self) -> String {
        format!("{:#x}", self.transaction_hash)
    }
}

/// Events emitted by the agent contract.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr, Serialize, Deserialize)]
#[serde(tag = "kind", content = "params")]
pub enum AgentEvent {
    ConversationAdded {
        user: Address,
        conversation_id: U256,
        conversation_cid: String,
        metadata_cid: String,
    },
    ConversationBranched {
        user: Address,
        original_conversation_id: U256,
        new_conversation_id: U256,
        conversation_cid: String,
        metadata_cid: String,
    },
    PromptMessageAdded {
        conversation_id: U256,
        message_id: U256,
        message_cid: String,
    },
    AnswerMessageAdded {
        conversation_id: U256,
        message_id: U256,
        message_cid: String,
    },
    SearchIndexDeltaAdded {
        conversation_id: U256,
        message_id: U256,
        search_delta_cid: String,
    },
    ConversationMetadataUpdated {
        conversation_id: U256,
        new_metadata_cid: String,
    },
    PromptSubmitted {
        user: Address,
        conversation_id: U256,
        prompt_message_id: U256,
        answer_message_id: U256,
        encrypted_payload: Bytes,
    },
    PromptCancelled {
        user: Address,
        answer_message_id: U256,
    },
    BranchRequested {
        user: Address,
        original_conversation_id: U256,
    },
    MetadataUpdateRequested {
        user: Address,
        conversation_id: U256,
    },
}

/// Events emitted by the escrow contract.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr, Serialize, Deserialize)]
#[serde(tag = "kind", content = "params")]
pub enum EscrowEvent {
    PaymentEscrowed {
        escrow_id: U256,
        user: Address,
        amount: U256,
    },
    PaymentFinalized {
        escrow_id: U256,
    },
    PaymentRefunded {
        escrow_id: U256,
    },
    SpendingLimitSet {
        user: Address,
        allowance: U256,
        expires_at: U256,
    },
    SpendingLimitCancelled {
        user: Address,
    },
    PromptCancelled {
        user: Address,
        answer_message_id: U256,
    },
}

/// A decoded payload tagged with the contract family that defines it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "event", rename_all = "lowercase")]
pub enum EventPayload {
    Agent(AgentEvent),
    Escrow(EscrowEvent),
}

impl EventPayload {
    pub fn contract_kind(&self) -> ContractKind {
        match self {
            Self::Agent(_) => ContractKind::Agent,
            Self::Escrow(_) => ContractKind::Escrow,
        }
    }

    /// Event kind name, e.g. `PaymentRefunded`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Agent(event) => event.into(),
            Self::Escrow(event) => event.into(),
        }
    }
}

/// One entry of the ordered event feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEvent {
    pub context: EventContext,
    pub payload: EventPayload,
}

impl ChainEvent {
    pub fn position(&self) -> EventPosition {
        self.context.position()
    }
}
