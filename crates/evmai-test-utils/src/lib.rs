// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for EVMAI indexer tests.
//!
//! Provides in-memory adapters and event builders for fast, deterministic
//! tests without a database file or a JSON-RPC node.
//!
//! # Components
//!
//! - [`MemoryStore`] - `EntityStore` over in-memory maps, with snapshots
//! - [`MockChainReader`] - scripted contract reads with failure injection
//! - [`EventFactory`] - builds ordered `ChainEvent`s for both contracts
//! - [`VecEventSource`] - `EventSource` over a fixed list of events

pub mod builders;
pub mod mock_chain;
pub mod mock_source;
pub mod mock_store;

pub use builders::{AGENT, ESCROW, EventFactory, OTHER_USER, USER};
pub use mock_chain::MockChainReader;
pub use mock_source::VecEventSource;
pub use mock_store::{MemoryStore, StoreSnapshot};
