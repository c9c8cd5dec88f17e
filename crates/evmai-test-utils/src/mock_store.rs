// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory entity store.
//!
//! Mirrors the SQLite store's semantics: saves are whole-row upserts,
//! activity inserts are write-once, and activities list in insertion order
//! within equal timestamps.

use std::collections::BTreeMap;

use alloy_primitives::Address;
use async_trait::async_trait;
use tokio::sync::Mutex;

use evmai_core::types::{
    Activity, Conversation, EntityCounts, IndexerCursor, Message, Payment, PromptRequest,
    SearchDelta, SpendingLimit,
};
use evmai_core::{Adapter, AdapterType, EntityStore, HealthStatus, IndexerError};

/// Full copy of the store contents, comparable with `==`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub conversations: BTreeMap<String, Conversation>,
    pub messages: BTreeMap<String, Message>,
    pub search_deltas: BTreeMap<String, SearchDelta>,
    pub prompt_requests: BTreeMap<String, PromptRequest>,
    pub payments: BTreeMap<String, Payment>,
    pub spending_limits: BTreeMap<String, SpendingLimit>,
    /// Activities in insertion order.
    pub activities: Vec<Activity>,
    pub cursor: Option<IndexerCursor>,
}

impl StoreSnapshot {
    /// Snapshot without the cursor, for comparing entity state across runs.
    pub fn entities(&self) -> Self {
        Self {
            cursor: None,
            ..self.clone()
        }
    }

    pub fn activity(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }
}

/// `EntityStore` backed by maps behind a single async mutex.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything currently stored.
    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl Adapter for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::EntityStore
    }

    async fn health_check(&self) -> Result<HealthStatus, IndexerError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn load_conversation(&self, id: &str) -> Result<Option<Conversation>, IndexerError> {
        Ok(self.state.lock().await.conversations.get(id).cloned())
    }

    async fn save_conversation(&self, conversation: &Conversation) -> Result<(), IndexerError> {
        self.state
            .lock()
            .await
            .conversations
            .insert(conversation.id.clone(), conversation.clone());
        Ok(())
    }

    async fn load_message(&self, id: &str) -> Result<Option<Message>, IndexerError> {
        Ok(self.state.lock().await.messages.get(id).cloned())
    }

    async fn save_message(&self, message: &Message) -> Result<(), IndexerError> {
        self.state
            .lock()
            .await
            .messages
            .insert(message.id.clone(), message.clone());
        Ok(())
    }

    async fn load_search_delta(&self, id: &str) -> Result<Option<SearchDelta>, IndexerError> {
        Ok(self.state.lock().await.search_deltas.get(id).cloned())
    }

    async fn save_search_delta(&self, delta: &SearchDelta) -> Result<(), IndexerError> {
        self.state
            .lock()
            .await
            .search_deltas
            .insert(delta.id.clone(), delta.clone());
        Ok(())
    }

    async fn load_prompt_request(
        &self,
        id: &str,
    ) -> Result<Option<PromptRequest>, IndexerError> {
        Ok(self.state.lock().await.prompt_requests.get(id).cloned())
    }

    async fn save_prompt_request(&self, request: &PromptRequest) -> Result<(), IndexerError> {
        self.state
            .lock()
            .await
            .prompt_requests
            .insert(request.id.clone(), request.clone());
        Ok(())
    }

    async fn load_payment(&self, id: &str) -> Result<Option<Payment>, IndexerError> {
        Ok(self.state.lock().await.payments.get(id).cloned())
    }

    async fn save_payment(&self, payment: &Payment) -> Result<(), IndexerError> {
        self.state
            .lock()
            .await
            .payments
            .insert(payment.id.clone(), payment.clone());
        Ok(())
    }

    async fn load_spending_limit(
        &self,
        id: &str,
    ) -> Result<Option<SpendingLimit>, IndexerError> {
        Ok(self.state.lock().await.spending_limits.get(id).cloned())
    }

    async fn save_spending_limit(&self, limit: &SpendingLimit) -> Result<(), IndexerError> {
        self.state
            .lock()
            .await
            .spending_limits
            .insert(limit.id.clone(), limit.clone());
        Ok(())
    }

    async fn delete_spending_limit(&self, id: &str) -> Result<bool, IndexerError> {
        Ok(self.state.lock().await.spending_limits.remove(id).is_some())
    }

    async fn load_activity(&self, id: &str) -> Result<Option<Activity>, IndexerError> {
        Ok(self.state.lock().await.activity(id).cloned())
    }

    async fn insert_activity(&self, activity: &Activity) -> Result<bool, IndexerError> {
        let mut state = self.state.lock().await;
        if state.activity(&activity.id).is_some() {
            return Ok(false);
        }
        state.activities.push(activity.clone());
        Ok(true)
    }

    async fn list_activities(&self, user: &Address) -> Result<Vec<Activity>, IndexerError> {
        let state = self.state.lock().await;
        let mut rows: Vec<Activity> = state
            .activities
            .iter()
            .filter(|a| a.user == *user)
            .cloned()
            .collect();
        // Stable sort keeps insertion order within a timestamp.
        rows.sort_by_key(|a| a.timestamp);
        Ok(rows)
    }

    async fn load_cursor(&self) -> Result<Option<IndexerCursor>, IndexerError> {
        Ok(self.state.lock().await.cursor)
    }

    async fn save_cursor(&self, cursor: &IndexerCursor) -> Result<(), IndexerError> {
        self.state.lock().await.cursor = Some(*cursor);
        Ok(())
    }

    async fn entity_counts(&self) -> Result<EntityCounts, IndexerError> {
        let state = self.state.lock().await;
        Ok(EntityCounts {
            conversations: state.conversations.len() as u64,
            messages: state.messages.len() as u64,
            search_deltas: state.search_deltas.len() as u64,
            prompt_requests: state.prompt_requests.len() as u64,
            payments: state.payments.len() as u64,
            spending_limits: state.spending_limits.len() as u64,
            activities: state.activities.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::I256;
    use evmai_core::ActivityType;

    fn activity(id: &str, timestamp: u64) -> Activity {
        Activity {
            id: id.to_string(),
            user: Address::repeat_byte(1),
            activity_type: ActivityType::PlanUpdate,
            amount: I256::ZERO,
            timestamp,
            transaction_hash: "0x00".to_string(),
        }
    }

    #[tokio::test]
    async fn activity_insert_is_write_once() {
        let store = MemoryStore::new();
        assert!(store.insert_activity(&activity("a", 1)).await.unwrap());
        assert!(!store.insert_activity(&activity("a", 9)).await.unwrap());
        let stored = store.load_activity("a").await.unwrap().unwrap();
        assert_eq!(stored.timestamp, 1);
    }

    #[tokio::test]
    async fn activities_list_by_timestamp_then_insertion() {
        let store = MemoryStore::new();
        store.insert_activity(&activity("late", 5)).await.unwrap();
        store.insert_activity(&activity("first", 1)).await.unwrap();
        store.insert_activity(&activity("second", 1)).await.unwrap();
        let ids: Vec<String> = store
            .list_activities(&Address::repeat_byte(1))
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["first", "second", "late"]);
    }

    #[tokio::test]
    async fn delete_absent_limit_reports_false() {
        let store = MemoryStore::new();
        assert!(!store.delete_spending_limit("0xabc").await.unwrap());
    }
}
