// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON-RPC implementation of [`ChainReader`].
//!
//! Every read is an `eth_call` pinned to the block of the event being
//! handled, so fee values reflect contract state at that moment rather than
//! at the chain head.

use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, U256, hex};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use evmai_config::model::ChainConfig;
use evmai_core::{
    Adapter, AdapterType, ChainReader, ContractMethod, HealthStatus, IndexerError,
};

/// Width of one ABI return word.
const WORD_LEN: usize = 32;

/// `eth_call` client for view methods returning a single static word.
#[derive(Debug, Clone)]
pub struct RpcChainReader {
    client: reqwest::Client,
    rpc_url: String,
}

impl RpcChainReader {
    /// Build a reader for the configured endpoint.
    pub fn new(config: &ChainConfig) -> Result<Self, IndexerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IndexerError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            rpc_url: config.rpc_url.clone(),
        })
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, String> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });
        let response = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("{method} request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("{method} returned HTTP {status}"));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| format!("failed to parse {method} response JSON: {e}"))?;
        if let Some(error) = value.get("error") {
            return Err(format!("rpc returned error for {method}: {error}"));
        }
        value
            .get("result")
            .cloned()
            .ok_or_else(|| format!("{method} result was missing"))
    }

    /// Raw return data of `method` on `contract` at `block`.
    async fn eth_call(
        &self,
        contract: Address,
        method: ContractMethod,
        block: u64,
    ) -> Result<Bytes, IndexerError> {
        let params = json!([
            { "to": format!("{contract:#x}"), "data": hex::encode_prefixed(method.selector()) },
            format!("{block:#x}"),
        ]);
        debug!(%contract, method = method.signature(), block, "eth_call");

        let result = self
            .rpc_call("eth_call", params)
            .await
            .map_err(|message| read_error(contract, method, block, message))?;
        let raw = result
            .as_str()
            .ok_or_else(|| read_error(contract, method, block, "eth_call result is not a string"))?;
        Bytes::from_str(raw).map_err(|e| {
            read_error(contract, method, block, format!("eth_call result is not hex: {e}"))
        })
    }

    /// First return word of a view call.
    async fn read_word(
        &self,
        contract: Address,
        method: ContractMethod,
        block: u64,
    ) -> Result<[u8; WORD_LEN], IndexerError> {
        let data = self.eth_call(contract, method, block).await?;
        first_word(&data).ok_or_else(|| {
            read_error(
                contract,
                method,
                block,
                format!("expected at least {WORD_LEN} bytes of return data, got {}", data.len()),
            )
        })
    }
}

fn first_word(data: &[u8]) -> Option<[u8; WORD_LEN]> {
    data.get(..WORD_LEN)?.try_into().ok()
}

fn read_error(
    contract: Address,
    method: ContractMethod,
    block: u64,
    message: impl Into<String>,
) -> IndexerError {
    IndexerError::ChainRead {
        contract,
        method: method.signature().to_string(),
        block,
        message: message.into(),
    }
}

#[async_trait]
impl Adapter for RpcChainReader {
    fn name(&self) -> &str {
        "json-rpc"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ChainReader
    }

    async fn health_check(&self) -> Result<HealthStatus, IndexerError> {
        match self.rpc_call("eth_blockNumber", json!([])).await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(message) => Ok(HealthStatus::Unhealthy(message)),
        }
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn read_scalar(
        &self,
        contract: Address,
        method: ContractMethod,
        block: u64,
    ) -> Result<U256, IndexerError> {
        let word = self.read_word(contract, method, block).await?;
        Ok(U256::from_be_bytes(word))
    }

    async fn read_address(
        &self,
        contract: Address,
        method: ContractMethod,
        block: u64,
    ) -> Result<Address, IndexerError> {
        let word = self.read_word(contract, method, block).await?;
        if word[..WORD_LEN - 20].iter().any(|b| *b != 0) {
            return Err(read_error(
                contract,
                method,
                block,
                "return word is not a left-padded address",
            ));
        }
        Ok(Address::from_slice(&word[WORD_LEN - 20..]))
    }
}
