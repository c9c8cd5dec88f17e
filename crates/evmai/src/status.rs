// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `evmai status` command implementation.
//!
//! Reads the resume cursor and per-entity row counts from the store.

use evmai_config::EvmaiConfig;
use evmai_core::{EntityCounts, EntityStore, IndexerCursor, IndexerError};
use evmai_storage::SqliteStore;
use serde::Serialize;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub database_path: String,
    pub cursor: Option<IndexerCursor>,
    pub counts: EntityCounts,
}

/// Run the `evmai status` command.
pub async fn run_status(config: &EvmaiConfig, json: bool) -> Result<(), IndexerError> {
    let store = SqliteStore::open(&config.storage).await?;
    let report = StatusReport {
        database_path: config.storage.database_path.clone(),
        cursor: store.load_cursor().await?,
        counts: store.entity_counts().await?,
    };
    store.close().await?;

    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| IndexerError::Internal(format!("failed to render status: {e}")))?;
        println!("{rendered}");
    } else {
        print!("{}", format_report(&report));
    }
    Ok(())
}

fn format_report(report: &StatusReport) -> String {
    let cursor = match &report.cursor {
        Some(cursor) => format!("{} (saved at {})", cursor.position, cursor.updated_at),
        None => "none (nothing indexed yet)".to_string(),
    };
    let counts = &report.counts;
    let mut out = format!("database:        {}\ncursor:          {cursor}\n", report.database_path);
    for (name, count) in [
        ("conversations", counts.conversations),
        ("messages", counts.messages),
        ("search deltas", counts.search_deltas),
        ("prompt requests", counts.prompt_requests),
        ("payments", counts.payments),
        ("spending limits", counts.spending_limits),
        ("activities", counts.activities),
    ] {
        out.push_str(&format!("{:<17}{count}\n", format!("{name}:")));
    }
    out
}
