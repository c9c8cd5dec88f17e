// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reducer for conversation, message, search-delta and prompt-request events.
//!
//! Every operation re-loads what it mutates. Loads that miss skip the
//! dependent side effect; the primary write of a creation always happens.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256};
use tracing::{debug, warn};

use evmai_core::{
    Conversation, EntityStore, EventContext, IndexerError, Message, MessageRole, PromptRequest,
    SearchDelta, id_key,
};

use crate::reconcile::{self, PromptFlag};

/// Applies agent-contract events that build the conversation graph.
#[derive(Clone)]
pub struct ConversationReducer {
    store: Arc<dyn EntityStore>,
}

impl ConversationReducer {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// ConversationAdded.
    pub async fn conversation_added(
        &self,
        context: &EventContext,
        user: Address,
        conversation_id: &U256,
        conversation_cid: &str,
        metadata_cid: &str,
    ) -> Result<(), IndexerError> {
        let conversation = new_conversation(
            context,
            user,
            conversation_id,
            conversation_cid,
            metadata_cid,
            None,
        );
        self.create_conversation(conversation).await
    }

    /// ConversationBranched. The parent need not be indexed.
    pub async fn conversation_branched(
        &self,
        context: &EventContext,
        user: Address,
        original_conversation_id: &U256,
        new_conversation_id: &U256,
        conversation_cid: &str,
        metadata_cid: &str,
    ) -> Result<(), IndexerError> {
        let conversation = new_conversation(
            context,
            user,
            new_conversation_id,
            conversation_cid,
            metadata_cid,
            Some(id_key(original_conversation_id)),
        );
        self.create_conversation(conversation).await
    }

    async fn create_conversation(
        &self,
        mut conversation: Conversation,
    ) -> Result<(), IndexerError> {
        if let Some(existing) = self.store.load_conversation(&conversation.id).await? {
            warn!(
                conversation = %conversation.id,
                "conversation created twice, overwriting"
            );
            conversation.touch(existing.last_message_created_at);
        }
        self.store.save_conversation(&conversation).await
    }

    /// PromptMessageAdded and AnswerMessageAdded.
    ///
    /// An answer also marks the prompt request keyed by the same message id
    /// as answered.
    pub async fn message_added(
        &self,
        context: &EventContext,
        conversation_id: &U256,
        message_id: &U256,
        message_cid: &str,
        role: MessageRole,
    ) -> Result<(), IndexerError> {
        let message = Message {
            id: id_key(message_id),
            conversation: id_key(conversation_id),
            message_cid: message_cid.to_string(),
            role,
            created_at: context.block_timestamp,
            transaction_hash: context.transaction_hash_hex(),
        };
        self.store.save_message(&message).await?;

        reconcile::touch_conversation(
            self.store.as_ref(),
            &message.conversation,
            context.block_timestamp,
        )
        .await?;

        if role == MessageRole::Assistant {
            reconcile::flag_prompt_request(self.store.as_ref(), &message.id, PromptFlag::Answered)
                .await?;
        }
        Ok(())
    }

    /// SearchIndexDeltaAdded. The message row is not checked.
    pub async fn search_delta_added(
        &self,
        message_id: &U256,
        search_delta_cid: &str,
    ) -> Result<(), IndexerError> {
        let key = id_key(message_id);
        let delta = SearchDelta {
            id: key.clone(),
            message: key,
            search_delta_cid: search_delta_cid.to_string(),
        };
        self.store.save_search_delta(&delta).await
    }

    /// ConversationMetadataUpdated. The metadata contents stay opaque.
    pub async fn metadata_updated(
        &self,
        context: &EventContext,
        conversation_id: &U256,
        new_metadata_cid: &str,
    ) -> Result<(), IndexerError> {
        let key = id_key(conversation_id);
        let Some(mut conversation) = self.store.load_conversation(&key).await? else {
            debug!(conversation = %key, "metadata update for unindexed conversation skipped");
            return Ok(());
        };
        conversation.metadata_cid = new_metadata_cid.to_string();
        conversation.touch(context.block_timestamp);
        self.store.save_conversation(&conversation).await
    }

    /// PromptSubmitted. Keyed by the answer-message id.
    ///
    /// A replayed submission keeps flags already raised by later events.
    pub async fn prompt_submitted(
        &self,
        context: &EventContext,
        user: Address,
        conversation_id: &U256,
        prompt_message_id: &U256,
        answer_message_id: &U256,
        encrypted_payload: &Bytes,
    ) -> Result<(), IndexerError> {
        let mut request = PromptRequest {
            id: id_key(answer_message_id),
            prompt_message_id: id_key(prompt_message_id),
            conversation: id_key(conversation_id),
            user,
            encrypted_payload: encrypted_payload.clone(),
            is_cancelled: false,
            is_answered: false,
            is_refunded: false,
            created_at: context.block_timestamp,
            transaction_hash: context.transaction_hash_hex(),
        };
        if let Some(existing) = self.store.load_prompt_request(&request.id).await? {
            debug!(prompt_request = %request.id, "prompt request resubmitted, keeping flags");
            request.is_cancelled = existing.is_cancelled;
            request.is_answered = existing.is_answered;
            request.is_refunded = existing.is_refunded;
        }
        self.store.save_prompt_request(&request).await?;

        reconcile::touch_conversation(
            self.store.as_ref(),
            &request.conversation,
            context.block_timestamp,
        )
        .await?;
        Ok(())
    }

    /// PromptCancelled on the agent contract.
    pub async fn prompt_cancelled(
        &self,
        context: &EventContext,
        answer_message_id: &U256,
    ) -> Result<(), IndexerError> {
        let key = id_key(answer_message_id);
        if let Some(request) =
            reconcile::flag_prompt_request(self.store.as_ref(), &key, PromptFlag::Cancelled).await?
        {
            reconcile::touch_conversation(
                self.store.as_ref(),
                &request.conversation,
                context.block_timestamp,
            )
            .await?;
        }
        Ok(())
    }
}

fn new_conversation(
    context: &EventContext,
    owner: Address,
    conversation_id: &U256,
    conversation_cid: &str,
    metadata_cid: &str,
    branched_from: Option<String>,
) -> Conversation {
    Conversation {
        id: id_key(conversation_id),
        owner,
        conversation_cid: conversation_cid.to_string(),
        metadata_cid: metadata_cid.to_string(),
        last_message_created_at: context.block_timestamp,
        created_at_block: context.block_number,
        is_deleted: false,
        branched_from,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;
    use evmai_test_utils::MemoryStore;
    use tracing_test::traced_test;

    fn context(block: u64, timestamp: u64) -> EventContext {
        EventContext {
            block_number: block,
            block_timestamp: timestamp,
            transaction_hash: B256::repeat_byte(block as u8),
            transaction_index: 0,
            log_index: 0,
            contract: Address::repeat_byte(0x11),
        }
    }

    fn setup() -> (Arc<MemoryStore>, ConversationReducer) {
        let store = Arc::new(MemoryStore::new());
        let reducer = ConversationReducer::new(store.clone());
        (store, reducer)
    }

    #[tokio::test]
    async fn branch_records_parent_even_when_absent() {
        let (store, reducer) = setup();
        reducer
            .conversation_branched(
                &context(3, 300),
                Address::repeat_byte(0xaa),
                &U256::from(1u64),
                &U256::from(2u64),
                "A2",
                "B2",
            )
            .await
            .unwrap();
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.conversations["2"].branched_from.as_deref(), Some("1"));
        assert_eq!(snapshot.conversations["2"].created_at_block, 3);
        assert!(!snapshot.conversations.contains_key("1"));
    }

    #[tokio::test]
    #[traced_test]
    async fn duplicate_creation_overwrites_but_keeps_freshness() {
        let (store, reducer) = setup();
        let user = Address::repeat_byte(0xaa);
        let id = U256::from(1u64);
        reducer
            .conversation_added(&context(5, 500), user, &id, "A", "B")
            .await
            .unwrap();
        reducer
            .conversation_added(&context(2, 200), user, &id, "A2", "B2")
            .await
            .unwrap();

        let conversation = store.snapshot().await.conversations["1"].clone();
        assert_eq!(conversation.conversation_cid, "A2");
        assert_eq!(conversation.last_message_created_at, 500);
        assert!(logs_contain("conversation created twice"));
    }

    #[tokio::test]
    async fn message_without_conversation_is_still_recorded() {
        let (store, reducer) = setup();
        reducer
            .message_added(
                &context(1, 110),
                &U256::from(1u64),
                &U256::from(10u64),
                "C",
                MessageRole::User,
            )
            .await
            .unwrap();
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.messages["10"].conversation, "1");
        assert!(snapshot.conversations.is_empty());
    }

    #[tokio::test]
    async fn answer_marks_prompt_request_answered() {
        let (store, reducer) = setup();
        reducer
            .prompt_submitted(
                &context(1, 120),
                Address::repeat_byte(0xaa),
                &U256::from(1u64),
                &U256::from(10u64),
                &U256::from(11u64),
                &Bytes::from_static(b"sealed"),
            )
            .await
            .unwrap();
        reducer
            .message_added(
                &context(2, 140),
                &U256::from(1u64),
                &U256::from(11u64),
                "ANS",
                MessageRole::Assistant,
            )
            .await
            .unwrap();

        let snapshot = store.snapshot().await;
        let request = &snapshot.prompt_requests["11"];
        assert!(request.is_answered);
        assert_eq!(request.prompt_message_id, "10");
        assert_eq!(snapshot.messages["11"].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn metadata_update_for_missing_conversation_is_noop() {
        let (store, reducer) = setup();
        reducer
            .metadata_updated(&context(1, 100), &U256::from(9u64), "M")
            .await
            .unwrap();
        assert_eq!(store.snapshot().await, Default::default());
    }

    #[tokio::test]
    async fn search_delta_is_keyed_by_message() {
        let (store, reducer) = setup();
        reducer
            .search_delta_added(&U256::from(10u64), "D")
            .await
            .unwrap();
        let delta = store.snapshot().await.search_deltas["10"].clone();
        assert_eq!(delta.message, "10");
        assert_eq!(delta.search_delta_cid, "D");
    }
}
