// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits for the collaborators the indexer is driven by or calls into.
//!
//! All adapters extend the [`Adapter`] base trait and use `#[async_trait]`
//! so they can be held as trait objects.

pub mod adapter;
pub mod chain;
pub mod source;
pub mod store;

pub use adapter::Adapter;
pub use chain::ChainReader;
pub use source::EventSource;
pub use store::EntityStore;
