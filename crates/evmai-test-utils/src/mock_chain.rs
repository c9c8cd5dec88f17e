// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted chain reader for deterministic fee lookups.
//!
//! Values are keyed by (contract, method) and optionally pinned to a block;
//! a block-pinned value wins over the unpinned one. Reads that hit no script
//! fail with `ChainRead`, the same error a node returns for a revert.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use tokio::sync::Mutex;

use evmai_core::{
    Adapter, AdapterType, ChainReader, ContractMethod, HealthStatus, IndexerError,
};

#[derive(Debug, Clone, Copy)]
enum Scripted {
    Scalar(U256),
    Address(Address),
    Fail,
}

type Key = (Address, &'static str, Option<u64>);

/// A read the indexer performed, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedRead {
    pub contract: Address,
    pub method: ContractMethod,
    pub block: u64,
}

/// A `ChainReader` answering from a script.
#[derive(Default)]
pub struct MockChainReader {
    script: Mutex<HashMap<Key, Scripted>>,
    reads: Mutex<Vec<RecordedRead>>,
}

impl MockChainReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method` on `contract` with `value` at every block.
    pub async fn set_scalar(&self, contract: Address, method: ContractMethod, value: U256) {
        self.insert((contract, method.signature(), None), Scripted::Scalar(value))
            .await;
    }

    /// Answer `method` on `contract` with `value` at one block only.
    pub async fn set_scalar_at(
        &self,
        contract: Address,
        method: ContractMethod,
        block: u64,
        value: U256,
    ) {
        self.insert(
            (contract, method.signature(), Some(block)),
            Scripted::Scalar(value),
        )
        .await;
    }

    /// Answer `method` on `contract` with an address at every block.
    pub async fn set_address(&self, contract: Address, method: ContractMethod, value: Address) {
        self.insert((contract, method.signature(), None), Scripted::Address(value))
            .await;
    }

    /// Make every read of `method` on `contract` fail.
    pub async fn fail(&self, contract: Address, method: ContractMethod) {
        self.insert((contract, method.signature(), None), Scripted::Fail)
            .await;
    }

    /// Every read performed so far.
    pub async fn reads(&self) -> Vec<RecordedRead> {
        self.reads.lock().await.clone()
    }

    async fn insert(&self, key: Key, value: Scripted) {
        self.script.lock().await.insert(key, value);
    }

    async fn lookup(
        &self,
        contract: Address,
        method: ContractMethod,
        block: u64,
    ) -> Result<Scripted, IndexerError> {
        self.reads.lock().await.push(RecordedRead {
            contract,
            method,
            block,
        });
        let script = self.script.lock().await;
        let entry = script
            .get(&(contract, method.signature(), Some(block)))
            .or_else(|| script.get(&(contract, method.signature(), None)))
            .copied();
        match entry {
            Some(Scripted::Fail) => Err(read_error(contract, method, block, "scripted failure")),
            Some(value) => Ok(value),
            None => Err(read_error(contract, method, block, "execution reverted")),
        }
    }
}

fn read_error(
    contract: Address,
    method: ContractMethod,
    block: u64,
    message: &str,
) -> IndexerError {
    IndexerError::ChainRead {
        contract,
        method: method.signature().to_string(),
        block,
        message: message.to_string(),
    }
}

#[async_trait]
impl Adapter for MockChainReader {
    fn name(&self) -> &str {
        "mock-chain"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ChainReader
    }

    async fn health_check(&self) -> Result<HealthStatus, IndexerError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn read_scalar(
        &self,
        contract: Address,
        method: ContractMethod,
        block: u64,
    ) -> Result<U256, IndexerError> {
        match self.lookup(contract, method, block).await? {
            Scripted::Scalar(value) => Ok(value),
            _ => Err(read_error(contract, method, block, "scripted value is not a uint256")),
        }
    }

    async fn read_address(
        &self,
        contract: Address,
        method: ContractMethod,
        block: u64,
    ) -> Result<Address, IndexerError> {
        match self.lookup(contract, method, block).await? {
            Scripted::Address(value) => Ok(value),
            _ => Err(read_error(contract, method, block, "scripted value is not an address")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evmai_core::methods::{BRANCH_FEE, CANCELLATION_FEE};

    #[tokio::test]
    async fn block_pinned_value_wins() {
        let chain = MockChainReader::new();
        let escrow = Address::repeat_byte(2);
        chain.set_scalar(escrow, BRANCH_FEE, U256::from(10u64)).await;
        chain
            .set_scalar_at(escrow, BRANCH_FEE, 7, U256::from(70u64))
            .await;

        assert_eq!(
            chain.read_scalar(escrow, BRANCH_FEE, 6).await.unwrap(),
            U256::from(10u64)
        );
        assert_eq!(
            chain.read_scalar(escrow, BRANCH_FEE, 7).await.unwrap(),
            U256::from(70u64)
        );
        assert_eq!(chain.reads().await.len(), 2);
    }

    #[tokio::test]
    async fn unscripted_and_failing_reads_error() {
        let chain = MockChainReader::new();
        let escrow = Address::repeat_byte(2);
        assert!(chain.read_scalar(escrow, CANCELLATION_FEE, 1).await.is_err());

        chain.fail(escrow, CANCELLATION_FEE).await;
        let err = chain
            .read_scalar(escrow, CANCELLATION_FEE, 1)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
