// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity store trait for persistence backends (SQLite, in-memory).

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::error::IndexerError;
use crate::traits::adapter::Adapter;
use crate::types::{
    Activity, Conversation, EntityCounts, IndexerCursor, Message, Payment, PromptRequest,
    SearchDelta, SpendingLimit,
};

/// Keyed load/save/delete for every derived entity.
///
/// Loads return `Ok(None)` when the key is absent. Saves are upserts: a save
/// for an existing key replaces the whole row. Single-record atomicity is the
/// only transactional guarantee callers may rely on.
#[async_trait]
pub trait EntityStore: Adapter {
    // --- Conversation reducer entities ---

    async fn load_conversation(&self, id: &str) -> Result<Option<Conversation>, IndexerError>;

    async fn save_conversation(&self, conversation: &Conversation) -> Result<(), IndexerError>;

    async fn load_message(&self, id: &str) -> Result<Option<Message>, IndexerError>;

    async fn save_message(&self, message: &Message) -> Result<(), IndexerError>;

    async fn load_search_delta(&self, id: &str) -> Result<Option<SearchDelta>, IndexerError>;

    async fn save_search_delta(&self, delta: &SearchDelta) -> Result<(), IndexerError>;

    async fn load_prompt_request(&self, id: &str)
    -> Result<Option<PromptRequest>, IndexerError>;

    async fn save_prompt_request(&self, request: &PromptRequest) -> Result<(), IndexerError>;

    // --- Payment reducer entities ---

    async fn load_payment(&self, id: &str) -> Result<Option<Payment>, IndexerError>;

    async fn save_payment(&self, payment: &Payment) -> Result<(), IndexerError>;

    async fn load_spending_limit(&self, id: &str)
    -> Result<Option<SpendingLimit>, IndexerError>;

    async fn save_spending_limit(&self, limit: &SpendingLimit) -> Result<(), IndexerError>;

    /// Deletes the spending limit. Returns false if no row existed.
    async fn delete_spending_limit(&self, id: &str) -> Result<bool, IndexerError>;

    // --- Activity ledger ---

    async fn load_activity(&self, id: &str) -> Result<Option<Activity>, IndexerError>;

    /// Inserts a ledger row unless its key already exists.
    ///
    /// Returns false when the key was present; the stored row is left as is.
    async fn insert_activity(&self, activity: &Activity) -> Result<bool, IndexerError>;

    /// Ledger rows for one user, oldest first.
    async fn list_activities(&self, user: &Address) -> Result<Vec<Activity>, IndexerError>;

    // --- Bookkeeping ---

    async fn load_cursor(&self) -> Result<Option<IndexerCursor>, IndexerError>;

    async fn save_cursor(&self, cursor: &IndexerCursor) -> Result<(), IndexerError>;

    async fn entity_counts(&self) -> Result<EntityCounts, IndexerError>;
}
