// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the EVMAI indexer.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! rejected at startup instead of silently falling back to a default.

use serde::{Deserialize, Serialize};

/// Top-level indexer configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section is optional and has defaults, except
/// that `run` refuses to start without both contract addresses.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EvmaiConfig {
    /// Process-level settings.
    #[serde(default)]
    pub indexer: IndexerConfig,

    /// Addresses of the indexed contracts.
    #[serde(default)]
    pub contracts: ContractsConfig,

    /// Entity store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// JSON-RPC endpoint used for point-in-time contract reads.
    #[serde(default)]
    pub chain: ChainConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IndexerConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Contract addresses as 0x-prefixed hex strings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContractsConfig {
    /// Agent contract (conversations, messages, prompts).
    #[serde(default)]
    pub agent: Option<String>,

    /// Escrow contract (payments, spending limits).
    #[serde(default)]
    pub escrow: Option<String>,
}

/// SQLite entity store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("evmai").join("evmai.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("evmai.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    /// HTTP(S) JSON-RPC endpoint serving `eth_call` at historical blocks.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Per-request timeout for contract reads.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
