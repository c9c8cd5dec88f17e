// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Point-in-time contract state reads.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::error::IndexerError;
use crate::methods::ContractMethod;
use crate::traits::adapter::Adapter;

/// Reads contract view methods at a fixed block.
///
/// Implementations must be deterministic for a given
/// `(contract, method, block)` so that replays produce identical ledgers.
/// A read that cannot be resolved returns [`IndexerError::ChainRead`].
#[async_trait]
pub trait ChainReader: Adapter {
    /// Reads a `uint256` returned by `method` on `contract` at `block`.
    async fn read_scalar(
        &self,
        contract: Address,
        method: ContractMethod,
        block: u64,
    ) -> Result<U256, IndexerError>;

    /// Reads an `address` returned by `method` on `contract` at `block`.
    async fn read_address(
        &self,
        contract: Address,
        method: ContractMethod,
        block: u64,
    ) -> Result<Address, IndexerError>;
}
