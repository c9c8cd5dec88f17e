// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: address syntax, URL scheme,
//! non-empty paths, positive timeouts.

use std::str::FromStr;

use alloy_primitives::Address;

use crate::diagnostic::ConfigError;
use crate::model::EvmaiConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &EvmaiConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.indexer.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "indexer.log_level `{}` must be one of {}",
                config.indexer.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    let agent = check_address("contracts.agent", config.contracts.agent.as_deref(), &mut errors);
    let escrow = check_address(
        "contracts.escrow",
        config.contracts.escrow.as_deref(),
        &mut errors,
    );
    if agent.is_some() && agent == escrow {
        errors.push(ConfigError::Validation {
            message: "contracts.agent and contracts.escrow must be different addresses"
                .to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let rpc_url = config.chain.rpc_url.trim();
    if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
        errors.push(ConfigError::Validation {
            message: format!("chain.rpc_url `{rpc_url}` must be an http:// or https:// URL"),
        });
    }

    if config.chain.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "chain.timeout_secs must be greater than zero".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parsed contract addresses, required before indexing can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    pub agent: Address,
    pub escrow: Address,
}

/// Resolve both contract addresses, reporting each one that is missing or malformed.
pub fn resolve_contracts(config: &EvmaiConfig) -> Result<ContractAddresses, Vec<ConfigError>> {
    let mut errors = Vec::new();
    let agent = require_address("contracts.agent", config.contracts.agent.as_deref(), &mut errors);
    let escrow = require_address(
        "contracts.escrow",
        config.contracts.escrow.as_deref(),
        &mut errors,
    );
    match (agent, escrow) {
        (Some(agent), Some(escrow)) if errors.is_empty() => Ok(ContractAddresses { agent, escrow }),
        _ => Err(errors),
    }
}

fn check_address(key: &str, raw: Option<&str>, errors: &mut Vec<ConfigError>) -> Option<Address> {
    let raw = raw?.trim();
    match Address::from_str(raw) {
        Ok(address) => Some(address),
        Err(err) => {
            errors.push(ConfigError::Validation {
                message: format!("{key} `{raw}` is not a 20-byte hex address: {err}"),
            });
            None
        }
    }
}

fn require_address(
    key: &str,
    raw: Option<&str>,
    errors: &mut Vec<ConfigError>,
) -> Option<Address> {
    if raw.is_none() {
        errors.push(ConfigError::MissingKey {
            key: key.to_string(),
        });
        return None;
    }
    check_address(key, raw, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGENT: &str = "0x1111111111111111111111111111111111111111";
    const ESCROW: &str = "0x2222222222222222222222222222222222222222";

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = EvmaiConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = EvmaiConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn malformed_address_fails_validation() {
        let mut config = EvmaiConfig::default();
        config.contracts.agent = Some("0x1234".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "contracts.agent"));
    }

    #[test]
    fn identical_contract_addresses_fail_validation() {
        let mut config = EvmaiConfig::default();
        config.contracts.agent = Some(AGENT.to_string());
        config.contracts.escrow = Some(AGENT.to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "must be different"));
    }

    #[test]
    fn collects_every_failure() {
        let mut config = EvmaiConfig::default();
        config.indexer.log_level = "loud".to_string();
        config.chain.rpc_url = "ws://node".to_string();
        config.chain.timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(has_message(&errors, "log_level"));
        assert!(has_message(&errors, "rpc_url"));
        assert!(has_message(&errors, "timeout_secs"));
    }

    #[test]
    fn resolve_contracts_requires_both() {
        let mut config = EvmaiConfig::default();
        config.contracts.agent = Some(AGENT.to_string());
        let errors = resolve_contracts(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], ConfigError::MissingKey { key } if key == "contracts.escrow"));

        config.contracts.escrow = Some(ESCROW.to_string());
        let resolved = resolve_contracts(&config).unwrap();
        assert_eq!(resolved.agent, Address::from_str(AGENT).unwrap());
        assert_eq!(resolved.escrow, Address::from_str(ESCROW).unwrap());
    }
}
