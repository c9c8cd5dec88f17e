// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort writes that cross from one reducer's entities into another's.
//!
//! A missing target is a skipped side effect, never an error: during partial
//! backfills the referenced entity may not be indexed yet.

use tracing::debug;

use evmai_core::{EntityStore, IndexerError, PromptRequest};

/// One of the independent, monotone flags on a prompt request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptFlag {
    Cancelled,
    Answered,
    Refunded,
}

impl PromptFlag {
    fn set(self, request: &mut PromptRequest) -> bool {
        let flag = match self {
            Self::Cancelled => &mut request.is_cancelled,
            Self::Answered => &mut request.is_answered,
            Self::Refunded => &mut request.is_refunded,
        };
        let changed = !*flag;
        *flag = true;
        changed
    }
}

/// Move a conversation's freshness marker forward to `timestamp`.
///
/// Returns whether the conversation exists.
pub async fn touch_conversation(
    store: &dyn EntityStore,
    key: &str,
    timestamp: u64,
) -> Result<bool, IndexerError> {
    let Some(mut conversation) = store.load_conversation(key).await? else {
        debug!(conversation = key, "conversation not indexed, freshness bump skipped");
        return Ok(false);
    };
    if conversation.touch(timestamp) {
        store.save_conversation(&conversation).await?;
    }
    Ok(true)
}

/// Set `flag` on the prompt request keyed by answer-message id.
///
/// Returns the request as stored afterwards, or `None` when it is not indexed.
pub async fn flag_prompt_request(
    store: &dyn EntityStore,
    key: &str,
    flag: PromptFlag,
) -> Result<Option<PromptRequest>, IndexerError> {
    let Some(mut request) = store.load_prompt_request(key).await? else {
        debug!(prompt_request = key, ?flag, "prompt request not indexed, flag skipped");
        return Ok(None);
    };
    if flag.set(&mut request) {
        store.save_prompt_request(&request).await?;
    }
    Ok(Some(request))
}

/// Flag a prompt request refunded and bump its conversation.
///
/// Returns whether the prompt request exists.
pub async fn mark_prompt_refunded(
    store: &dyn EntityStore,
    key: &str,
    timestamp: u64,
) -> Result<bool, IndexerError> {
    match flag_prompt_request(store, key, PromptFlag::Refunded).await? {
        Some(request) => {
            touch_conversation(store, &request.conversation, timestamp).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}
