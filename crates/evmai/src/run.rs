// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `evmai run` command implementation.

use std::path::Path;
use std::sync::Arc;

use evmai_chain::{JsonlEventSource, RpcChainReader};
use evmai_config::EvmaiConfig;
use evmai_core::{Adapter, HealthStatus, IndexerError};
use evmai_indexer::{ContractRegistry, Indexer, RunMode, RunSummary};
use evmai_storage::SqliteStore;
use tracing::{error, info, warn};

/// Index the event feed at `events` into the configured store.
///
/// Both contract addresses must be configured. The store is closed even
/// when the run fails, so the cursor written so far is checkpointed.
pub async fn run_indexer(
    config: &EvmaiConfig,
    events: &Path,
    replay: bool,
) -> Result<(), IndexerError> {
    let contracts = evmai_config::resolve_contracts(config).map_err(|errors| {
        evmai_config::render_errors(&errors);
        IndexerError::Config("contract addresses are required to run".to_string())
    })?;
    let registry = ContractRegistry::from(contracts);

    let chain = Arc::new(RpcChainReader::new(&config.chain)?);
    if let HealthStatus::Unhealthy(reason) = chain.health_check().await? {
        warn!(rpc_url = %config.chain.rpc_url, %reason, "chain endpoint unhealthy");
    }

    let mut source = JsonlEventSource::open(events).await?;
    let store = Arc::new(SqliteStore::open(&config.storage).await?);
    info!(
        agent = %registry.agent(),
        escrow = %registry.escrow(),
        database = %config.storage.database_path,
        "indexer starting"
    );

    let mode = if replay { RunMode::Replay } else { RunMode::Resume };
    let indexer = Indexer::new(store.clone(), chain, registry);
    let outcome = indexer.run(&mut source, mode).await;
    drop(indexer);

    let closed = match Arc::try_unwrap(store) {
        Ok(store) => store.close().await,
        Err(_) => Ok(()),
    };

    let summary = settle(outcome, closed).map_err(|e| {
        warn!(line = source.lines_read(), error = %e, "run stopped");
        e
    })?;
    match summary.last_position {
        Some(position) => println!(
            "handled {} events, skipped {}, cursor at {position}",
            summary.handled, summary.skipped
        ),
        None => println!(
            "handled {} events, skipped {}",
            summary.handled, summary.skipped
        ),
    }
    Ok(())
}

/// Combine the run outcome with the store close result.
///
/// A run error wins; a close failure after it is only logged.
fn settle(
    outcome: Result<RunSummary, IndexerError>,
    closed: Result<(), IndexerError>,
) -> Result<RunSummary, IndexerError> {
    match (outcome, closed) {
        (Ok(summary), Ok(())) => Ok(summary),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(run_err), Ok(())) => Err(run_err),
        (Err(run_err), Err(close_err)) => {
            error!(error = %close_err, "store close failed after run error");
            Err(run_err)
        }
    }
}
