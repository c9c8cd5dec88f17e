// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the EVMAI configuration system.

use evmai_config::diagnostic::ConfigError;
use evmai_config::model::EvmaiConfig;
use evmai_config::{load_and_validate_str, load_config_from_str, resolve_contracts};

const FULL: &str = r#"
[indexer]
log_level = "debug"

[contracts]
agent = "0x1111111111111111111111111111111111111111"
escrow = "0x2222222222222222222222222222222222222222"

[storage]
database_path = "/tmp/evmai-test.db"
wal_mode = false

[chain]
rpc_url = "https://rpc.example.org"
timeout_secs = 10
"#;

#[test]
fn full_toml_deserializes() {
    let config = load_config_from_str(FULL).expect("valid TOML should deserialize");
    assert_eq!(config.indexer.log_level, "debug");
    assert_eq!(
        config.contracts.agent.as_deref(),
        Some("0x1111111111111111111111111111111111111111")
    );
    assert_eq!(config.storage.database_path, "/tmp/evmai-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.chain.rpc_url, "https://rpc.example.org");
    assert_eq!(config.chain.timeout_secs, 10);

    let contracts = resolve_contracts(&config).expect("both addresses present");
    assert_ne!(contracts.agent, contracts.escrow);
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").unwrap();
    let defaults = EvmaiConfig::default();
    assert_eq!(config.indexer.log_level, defaults.indexer.log_level);
    assert_eq!(config.chain.rpc_url, "http://127.0.0.1:8545");
    assert_eq!(config.chain.timeout_secs, 30);
    assert!(config.storage.wal_mode);
    assert!(config.contracts.agent.is_none());
}

#[test]
fn misspelled_key_gets_suggestion() {
    let toml = r#"
[storage]
databse_path = "/tmp/x.db"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey { key, suggestion, .. } if key == "databse_path" => {
            suggestion.clone()
        }
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("database_path"));
}

#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[telemetry]
enabled = true
"#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[chain]
timeout_secs = "soon"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(
                e,
                ConfigError::InvalidType { key, .. } if key.contains("timeout_secs")
            )),
        "expected an invalid type error, got {errors:?}"
    );
}

#[test]
fn semantic_errors_surface_through_load() {
    let toml = r#"
[contracts]
agent = "not-an-address"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("contracts.agent"))
    ));
}
