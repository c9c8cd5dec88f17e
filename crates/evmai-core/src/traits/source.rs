// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered inbound event feed.

use async_trait::async_trait;

use crate::error::IndexerError;
use crate::events::ChainEvent;
use crate::traits::adapter::Adapter;

/// Yields decoded events in log order, one at a time.
///
/// Delivery is at-least-once: a source may hand out an event that was
/// already handled before a restart.
#[async_trait]
pub trait EventSource: Adapter {
    /// Returns the next event, or `None` once the feed is exhausted.
    async fn next_event(&mut self) -> Result<Option<ChainEvent>, IndexerError>;
}
