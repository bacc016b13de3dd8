//! On-disk layout of the three sinks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tokio::fs;

use alerts_core::logging::SinkName;
use alerts_core::{Severity, SinkError, SinkSet};

use super::FileSink;

/// `<base>/<YYYY-MM-DD>/<sink>/app.log`, one directory per sink.
///
/// The date is fixed when the layout is built; a long-running process keeps
/// writing into the directory of the day it started.
#[derive(Debug, Clone)]
pub struct LogLayout {
    root: PathBuf,
}

impl LogLayout {
    pub fn new(base_dir: impl AsRef<Path>, date: NaiveDate) -> Self {
        Self {
            root: base_dir.as_ref().join(date.format("%Y-%m-%d").to_string()),
        }
    }

    /// Layout for the current local date.
    pub fn today(base_dir: impl AsRef<Path>) -> Self {
        Self::new(base_dir, Local::now().date_naive())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, sink: SinkName) -> PathBuf {
        self.root.join(sink.as_str()).join("app.log")
    }

    /// Create the per-sink directories.
    pub async fn create_dirs(&self) -> Result<(), SinkError> {
        for sink in SinkName::ALL {
            let dir = self.root.join(sink.as_str());
            fs::create_dir_all(&dir).await.map_err(|e| SinkError::Open {
                path: dir.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Open all three file sinks with a shared threshold.
    pub async fn open(&self, threshold: Severity) -> Result<SinkSet, SinkError> {
        self.create_dirs().await?;

        let info = FileSink::open(self.path_for(SinkName::Info)).await?;
        let error = FileSink::open(self.path_for(SinkName::Error)).await?;
        let request = FileSink::open(self.path_for(SinkName::Request)).await?;

        tracing::info!(
            root = %self.root.display(),
            threshold = %threshold,
            "Request log sinks ready"
        );

        Ok(SinkSet::new(
            threshold,
            Arc::new(info),
            Arc::new(error),
            Arc::new(request),
        ))
    }
}
