// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event source over a fixed list of events.

use std::collections::VecDeque;

use async_trait::async_trait;

use evmai_core::{Adapter, AdapterType, ChainEvent, EventSource, HealthStatus, IndexerError};

/// Yields the given events in order, then `None`.
pub struct VecEventSource {
    events: VecDeque<ChainEvent>,
}

impl VecEventSource {
    pub fn new(events: Vec<ChainEvent>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

#[async_trait]
impl Adapter for VecEventSource {
    fn name(&self) -> &str {
        "vec"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::EventSource
    }

    async fn health_check(&self) -> Result<HealthStatus, IndexerError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl EventSource for VecEventSource {
    async fn next_event(&mut self) -> Result<Option<ChainEvent>, IndexerError> {
        Ok(self.events.pop_front())
    }
}
