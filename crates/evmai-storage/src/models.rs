// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity types stored by this crate.
//!
//! The canonical definitions live in `evmai-core::types` so reducers and
//! stores share them; this module re-exports them for the query modules.

pub use evmai_core::types::{
    Activity, ActivityType, Conversation, EntityCounts, IndexerCursor, Message, MessageRole,
    Payment, PaymentStatus, PromptRequest, SearchDelta, SpendingLimit,
};
