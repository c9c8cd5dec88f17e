// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Newline-delimited JSON event feed.
//!
//! One [`ChainEvent`] per line, already decoded and in log order. Blank lines
//! are skipped. A line that does not decode stops the feed with the line
//! number in the error.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tracing::trace;

use evmai_core::{Adapter, AdapterType, ChainEvent, EventSource, HealthStatus, IndexerError};

/// Reads events from a `.jsonl` file.
pub struct JsonlEventSource {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_number: usize,
}

impl JsonlEventSource {
    /// Open the feed file for reading.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, IndexerError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).await.map_err(|e| IndexerError::Decode {
            message: format!("cannot open event feed {}: {e}", path.display()),
        })?;
        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line_number: 0,
        })
    }

    /// Number of lines consumed so far, blank lines included.
    pub fn lines_read(&self) -> usize {
        self.line_number
    }
}

#[async_trait]
impl Adapter for JsonlEventSource {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::EventSource
    }

    async fn health_check(&self) -> Result<HealthStatus, IndexerError> {
        if self.path.exists() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy(format!(
                "event feed {} no longer exists",
                self.path.display()
            )))
        }
    }
}

#[async_trait]
impl EventSource for JsonlEventSource {
    async fn next_event(&mut self) -> Result<Option<ChainEvent>, IndexerError> {
        loop {
            let line = self.lines.next_line().await.map_err(|e| IndexerError::Decode {
                message: format!(
                    "{}:{}: read failed: {e}",
                    self.path.display(),
                    self.line_number + 1
                ),
            })?;
            let Some(line) = line else {
                return Ok(None);
            };
            self.line_number += 1;

            if line.trim().is_empty() {
                continue;
            }

            let event: ChainEvent =
                serde_json::from_str(&line).map_err(|e| IndexerError::Decode {
                    message: format!("{}:{}: {e}", self.path.display(), self.line_number),
                })?;
            trace!(line = self.line_number, position = %event.position(), "event decoded");
            return Ok(Some(event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EVENT: &str = r#"{"context":{"block_number":1,"block_timestamp":100,"transaction_hash":"0x0101010101010101010101010101010101010101010101010101010101010101","transaction_index":0,"log_index":0,"contract":"0x2222222222222222222222222222222222222222"},"payload":{"source":"escrow","event":{"kind":"SpendingLimitCancelled","params":{"user":"0x3333333333333333333333333333333333333333"}}}}"#;

    fn feed(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn reads_events_and_skips_blank_lines() {
        let file = feed(&format!("{EVENT}\n\n   \n{EVENT}\n"));
        let mut source = JsonlEventSource::open(file.path()).await.unwrap();

        assert!(source.next_event().await.unwrap().is_some());
        assert!(source.next_event().await.unwrap().is_some());
        assert!(source.next_event().await.unwrap().is_none());
        assert_eq!(source.lines_read(), 4);
    }

    #[tokio::test]
    async fn malformed_line_reports_line_number() {
        let file = feed(&format!("{EVENT}\n{{\"context\": 1}}\n"));
        let mut source = JsonlEventSource::open(file.path()).await.unwrap();

        source.next_event().await.unwrap();
        let err = source.next_event().await.unwrap_err();
        assert!(matches!(err, IndexerError::Decode { .. }));
        assert!(err.to_string().contains(":2:"), "got {err}");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = JsonlEventSource::open(dir.path().join("absent.jsonl")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn health_check_is_healthy_while_file_exists() {
        let file = feed(EVENT);
        let source = JsonlEventSource::open(file.path()).await.unwrap();
        assert_eq!(source.health_check().await.unwrap(), HealthStatus::Healthy);
        assert_eq!(source.adapter_type(), AdapterType::EventSource);
    }
}
