// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the EVMAI indexer.
//!
//! This crate provides the entity types derived from agent and escrow
//! contract events, the typed event payloads, the shared error type, and the
//! adapter traits the reducers depend on. Stores, chain readers, and event
//! feeds implement traits defined here.

pub mod error;
pub mod events;
pub mod methods;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::IndexerError;
pub use events::{
    AgentEvent, ChainEvent, ContractKind, EscrowEvent, EventContext, EventPayload, EventPosition,
};
pub use methods::ContractMethod;
pub use types::{
    Activity, ActivityType, AdapterType, Conversation, EntityCounts, HealthStatus, IndexerCursor,
    Message, MessageRole, Payment, PaymentStatus, PromptRequest, SearchDelta, SpendingLimit,
    address_key, id_key,
};

pub use traits::{Adapter, ChainReader, EntityStore, EventSource};
