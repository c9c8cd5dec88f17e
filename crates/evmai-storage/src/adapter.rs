// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the EntityStore trait.

use alloy_primitives::Address;
use async_trait::async_trait;
use tracing::debug;

use evmai_config::model::StorageConfig;
use evmai_core::types::{
    Activity, Conversation, EntityCounts, IndexerCursor, Message, Payment, PromptRequest,
    SearchDelta, SpendingLimit,
};
use evmai_core::{Adapter, AdapterType, EntityStore, HealthStatus, IndexerError};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed entity store.
///
/// Wraps a [`Database`] handle and delegates every operation to the typed
/// query modules.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Wrap an already opened database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the database named by the storage configuration.
    pub async fn open(config: &StorageConfig) -> Result<Self, IndexerError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "SQLite entity store opened");
        Ok(Self::new(db))
    }

    /// In-memory store for tests and dry runs.
    pub async fn open_in_memory() -> Result<Self, IndexerError> {
        Ok(Self::new(Database::open_in_memory().await?))
    }

    /// Conversations changed after `since`, oldest change first.
    pub async fn conversations_changed_since(
        &self,
        since: u64,
    ) -> Result<Vec<Conversation>, IndexerError> {
        queries::conversations::list_changed_since(&self.db, since).await
    }

    /// Messages of one conversation in creation order.
    pub async fn conversation_messages(
        &self,
        conversation: &str,
    ) -> Result<Vec<Message>, IndexerError> {
        queries::messages::get_messages_for_conversation(&self.db, conversation).await
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), IndexerError> {
        self.db.close().await?;
        debug!("SQLite entity store closed");
        Ok(())
    }
}

#[async_trait]
impl Adapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::EntityStore
    }

    async fn health_check(&self) -> Result<HealthStatus, IndexerError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl EntityStore for SqliteStore {
    // --- Conversation reducer entities ---

    async fn load_conversation(&self, id: &str) -> Result<Option<Conversation>, IndexerError> {
        queries::conversations::get_conversation(&self.db, id).await
    }

    async fn save_conversation(&self, conversation: &Conversation) -> Result<(), IndexerError> {
        queries::conversations::save_conversation(&self.db, conversation).await
    }

    async fn load_message(&self, id: &str) -> Result<Option<Message>, IndexerError> {
        queries::messages::get_message(&self.db, id).await
    }

    async fn save_message(&self, message: &Message) -> Result<(), IndexerError> {
        queries::messages::save_message(&self.db, message).await
    }

    async fn load_search_delta(&self, id: &str) -> Result<Option<SearchDelta>, IndexerError> {
        queries::messages::get_search_delta(&self.db, id).await
    }

    async fn save_search_delta(&self, delta: &SearchDelta) -> Result<(), IndexerError> {
        queries::messages::save_search_delta(&self.db, delta).await
    }

    async fn load_prompt_request(
        &self,
        id: &str,
    ) -> Result<Option<PromptRequest>, IndexerError> {
        queries::prompt_requests::get_prompt_request(&self.db, id).await
    }

    async fn save_prompt_request(&self, request: &PromptRequest) -> Result<(), IndexerError> {
        queries::prompt_requests::save_prompt_request(&self.db, request).await
    }

    // --- Payment reducer entities ---

    async fn load_payment(&self, id: &str) -> Result<Option<Payment>, IndexerError> {
        queries::payments::get_payment(&self.db, id).await
    }

    async fn save_payment(&self, payment: &Payment) -> Result<(), IndexerError> {
        queries::payments::save_payment(&self.db, payment).await
    }

    async fn load_spending_limit(
        &self,
        id: &str,
    ) -> Result<Option<SpendingLimit>, IndexerError> {
        queries::spending_limits::get_spending_limit(&self.db, id).await
    }

    async fn save_spending_limit(&self, limit: &SpendingLimit) -> Result<(), IndexerError> {
        queries::spending_limits::save_spending_limit(&self.db, limit).await
    }

    async fn delete_spending_limit(&self, id: &str) -> Result<bool, IndexerError> {
        queries::spending_limits::delete_spending_limit(&self.db, id).await
    }

    // --- Activity ledger ---

    async fn load_activity(&self, id: &str) -> Result<Option<Activity>, IndexerError> {
        queries::activities::get_activity(&self.db, id).await
    }

    async fn insert_activity(&self, activity: &Activity) -> Result<bool, IndexerError> {
        queries::activities::insert_activity(&self.db, activity).await
    }

    async fn list_activities(&self, user: &Address) -> Result<Vec<Activity>, IndexerError> {
        queries::activities::list_activities_for_user(&self.db, user).await
    }

    // --- Bookkeeping ---

    async fn load_cursor(&self) -> Result<Option<IndexerCursor>, IndexerError> {
        queries::cursor::load_cursor(&self.db).await
    }

    async fn save_cursor(&self, cursor: &IndexerCursor) -> Result<(), IndexerError> {
        queries::cursor::save_cursor(&self.db, cursor).await
    }

    async fn entity_counts(&self) -> Result<EntityCounts, IndexerError> {
        queries::cursor::entity_counts(&self.db).await
    }
}
