// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/evmai/evmai.toml`, then `~/.config/evmai/evmai.toml`,
//! then `./evmai.toml`, then `EVMAI_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::EvmaiConfig;

/// Sections that environment variables may address.
const SECTIONS: &[&str] = &["indexer", "contracts", "storage", "chain"];

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<EvmaiConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<EvmaiConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(EvmaiConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<EvmaiConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(EvmaiConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment without extracting it.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(EvmaiConfig::default()))
        .merge(Toml::file("/etc/evmai/evmai.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("evmai/evmai.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("evmai.toml"))
        .merge(env_provider())
}

/// Environment provider mapping `EVMAI_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after the section name is a separator, so
/// `EVMAI_STORAGE_DATABASE_PATH` maps to `storage.database_path`.
fn env_provider() -> Env {
    Env::prefixed("EVMAI_").map(|key| {
        // Figment keeps the variable's original case.
        let key_str = key.as_str().to_ascii_lowercase();
        SECTIONS
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or(key_str)
            .into()
    })
}
