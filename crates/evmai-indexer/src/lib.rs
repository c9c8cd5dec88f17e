// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event-to-state reducer for the EVMAI agent and escrow contracts.
//!
//! The [`Indexer`] takes decoded events one at a time, in chain order, and
//! folds them into an [`EntityStore`](evmai_core::EntityStore). Replaying an
//! event leaves the store as it was after the first delivery.

pub mod activity;
pub mod conversation;
pub mod dispatcher;
pub mod payment;
pub mod reconcile;

pub use activity::ActivityLedger;
pub use conversation::ConversationReducer;
pub use dispatcher::{ContractRegistry, Indexer, RunMode, RunSummary};
pub use payment::PaymentReducer;
