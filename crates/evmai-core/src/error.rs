// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the EVMAI indexer.

use alloy_primitives::Address;
use thiserror::Error;

use crate::events::{ContractKind, EventPosition};

/// The primary error type used across the indexer crates and adapter traits.
///
/// A load that finds nothing is not an error: stores return `Ok(None)` and
/// handlers skip the dependent side effect.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// Configuration errors (invalid TOML, unparsable addresses, missing sections).
    #[error("configuration error: {0}")]
    Config(String),

    /// Entity store failures (connection, query, row decoding).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A point-in-time contract read could not be resolved.
    ///
    /// Fatal to the current event: ledger rows depend on the exact value.
    #[error("chain read {method} on {contract} at block {block} failed: {message}")]
    ChainRead {
        contract: Address,
        method: String,
        block: u64,
        message: String,
    },

    /// An event could not be decoded or lacks a required parameter.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// The event was emitted by a contract that is not registered.
    #[error("event from unregistered contract {address}")]
    UnknownContract { address: Address },

    /// The payload family does not match the kind registered for the emitting contract.
    #[error("contract {address} is registered as {expected} but emitted an {found} event")]
    ContractMismatch {
        address: Address,
        expected: ContractKind,
        found: ContractKind,
    },

    /// The feed delivered an event earlier than the previous one.
    #[error("event at {current} arrived after {previous}")]
    OutOfOrder {
        previous: EventPosition,
        current: EventPosition,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IndexerError {
    /// Wrap any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }

    /// Returns true when retrying the same event could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::ChainRead { .. })
    }
}
