// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Derived entity types persisted by the entity store.
//!
//! Keys are plain strings: decimal for on-chain numeric ids, lowercase hex
//! for addresses, and `{transactionHash}-{logIndex}` for activity rows.

use alloy_primitives::{Address, Bytes, I256, U256};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::events::EventPosition;

/// Render an address the way entity keys and stored columns expect it.
pub fn address_key(address: &Address) -> String {
    format!("{address:#x}")
}

/// Render an on-chain numeric id as a decimal entity key.
pub fn id_key(id: &U256) -> String {
    id.to_string()
}

/// A conversation created on the agent contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub owner: Address,
    pub conversation_cid: String,
    pub metadata_cid: String,
    /// Change marker for downstream pollers. Bumped by every event that
    /// should make a consumer re-sync the conversation; never decreases.
    pub last_message_created_at: u64,
    pub created_at_block: u64,
    pub is_deleted: bool,
    /// Key of the parent conversation. Not enforced: the parent may be absent.
    pub branched_from: Option<String>,
}

impl Conversation {
    /// Move the freshness marker forward to `timestamp`.
    ///
    /// Returns false when the marker was already at or past it.
    pub fn touch(&mut self, timestamp: u64) -> bool {
        if timestamp > self.last_message_created_at {
            self.last_message_created_at = timestamp;
            true
        } else {
            false
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation: String,
    pub message_cid: String,
    pub role: MessageRole,
    pub created_at: u64,
    pub transaction_hash: String,
}

/// Search index delta attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDelta {
    pub id: String,
    pub message: String,
    pub search_delta_cid: String,
}

/// A submitted prompt awaiting an answer.
///
/// Keyed by the answer-message id: it is assigned at submission and is the
/// only id carried by the later cancellation, answer, and refund events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub id: String,
    pub prompt_message_id: String,
    pub conversation: String,
    pub user: Address,
    pub encrypted_payload: Bytes,
    pub is_cancelled: bool,
    pub is_answered: bool,
    pub is_refunded: bool,
    pub created_at: u64,
    pub transaction_hash: String,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Complete,
    Refunded,
}

impl PaymentStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Funds held by the escrow contract for one prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub user: Address,
    pub amount: U256,
    pub status: PaymentStatus,
    pub created_at: u64,
    pub finalized_at: Option<u64>,
    pub transaction_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingLimit {
    pub id: String,
    pub user: Address,
    pub allowance: U256,
    /// Contract expiry; `U256::MAX` is used on-chain for "never".
    pub expires_at: U256,
    pub updated_at: u64,
}

/// Category tag of an activity ledger row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    /// Funds escrowed for a prompt.
    ConversationSpend,
    /// Escrowed funds returned to the user.
    Refund,
    PlanUpdate,
    PlanRevoke,
    CancellationFee,
    BranchFee,
    MetadataUpdateFee,
}

/// Append-only ledger row. Negative amounts are debits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub user: Address,
    pub activity_type: ActivityType,
    pub amount: I256,
    pub timestamp: u64,
    pub transaction_hash: String,
}

/// Position of the last event whose handler completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerCursor {
    pub position: EventPosition,
    /// Wall-clock unix seconds when the cursor was saved.
    pub updated_at: u64,
}

/// Row counts per entity table, for operator status output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub conversations: u64,
    pub messages: u64,
    pub search_deltas: u64,
    pub prompt_requests: u64,
    pub payments: u64,
    pub spending_limits: u64,
    pub activities: u64,
}

/// Identifies the type of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    EntityStore,
    ChainReader,
    EventSource,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}
