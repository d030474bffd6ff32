//! Result logging: one CSV row per check outcome.
//!
//! The CSV sink opens the log in append mode for every record and writes the
//! header only when the file is empty at that moment. Nothing is cached
//! between writes, so several sequential runs against the same file keep a
//! single header. Concurrent writers are not supported.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::debug;

/// Header row of the result log.
pub const CSV_HEADER: [&str; 4] = ["Request Type", "Test", "Response Status", "Result"];

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to create result log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to open result log {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write result log {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequestType {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post,
    #[serde(rename = "PUT")]
    Put,
    #[serde(rename = "DELETE")]
    Delete,
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RequestType::Get => "GET",
            RequestType::Post => "POST",
            RequestType::Put => "PUT",
            RequestType::Delete => "DELETE",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Passed,
    Failed,
}

impl Outcome {
    pub fn is_passed(self) -> bool {
        self == Outcome::Passed
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Outcome::Passed => "Passed",
            Outcome::Failed => "Failed",
        })
    }
}

/// One logged outcome of a single check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    pub request_type: RequestType,
    pub test_name: String,
    pub response_status: u16,
    pub outcome: Outcome,
}

impl ResultRecord {
    pub fn new(
        request_type: RequestType,
        test_name: impl Into<String>,
        response_status: u16,
        outcome: Outcome,
    ) -> Self {
        Self {
            request_type,
            test_name: test_name.into(),
            response_status,
            outcome,
        }
    }

    /// Render the record as a CSV row (without line terminator).
    pub fn to_csv_row(&self) -> String {
        csv_row(&[
            &self.request_type.to_string(),
            &self.test_name,
            &self.response_status.to_string(),
            &self.outcome.to_string(),
        ])
    }
}

/// Destination for check outcomes.
#[async_trait::async_trait]
pub trait ResultSink: Send + Sync {
    async fn record(&self, record: &ResultRecord) -> Result<(), SinkError>;
}

/// Append-only CSV file sink.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl ResultSink for CsvSink {
    async fn record(&self, record: &ResultRecord) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| SinkError::CreateDir {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
        }

        // The handle is dropped, and the file closed, at the end of every call.
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| SinkError::Open {
                path: self.path.clone(),
                source,
            })?;

        let write_err = |source| SinkError::Write {
            path: self.path.clone(),
            source,
        };

        // In append mode the cursor starts at 0 until the first write, so
        // ask for the end explicitly.
        let position = file.seek(SeekFrom::End(0)).await.map_err(write_err)?;

        let mut buf = String::new();
        if position == 0 {
            buf.push_str(&csv_row(&CSV_HEADER));
            buf.push('\n');
        }
        buf.push_str(&record.to_csv_row());
        buf.push('\n');

        file.write_all(buf.as_bytes()).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;

        debug!(
            path = %self.path.display(),
            test = %record.test_name,
            outcome = %record.outcome,
            header = position == 0,
            "result recorded"
        );

        Ok(())
    }
}

/// In-memory sink, mainly for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<ResultRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, in append order.
    pub fn records(&self) -> Vec<ResultRecord> {
        match self.records.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait::async_trait]
impl ResultSink for MemorySink {
    async fn record(&self, record: &ResultRecord) -> Result<(), SinkError> {
        let mut guard = match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(record.clone());
        Ok(())
    }
}

fn csv_row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
