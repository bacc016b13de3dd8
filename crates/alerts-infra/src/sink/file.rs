//! Append-only file sink.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use alerts_core::SinkError;
use alerts_core::ports::LogSink;

/// A log file opened in append mode.
///
/// Each line is written with a single `write_all` while holding the file
/// lock, so lines from concurrent requests never interleave. Separate sinks
/// have separate locks and never wait on each other.
///
/// A write that fails partway may leave a torn line behind; the next line
/// then starts on a fresh line instead of being glued to it.
pub struct FileSink<W = File> {
    path: PathBuf,
    out: Mutex<Output<W>>,
}

struct Output<W> {
    writer: W,
    /// The last write failed, possibly mid-line.
    torn: bool,
}

impl FileSink {
    /// Open (or create) the file, creating missing parent directories.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| open_error(&path, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| open_error(&path, e))?;

        tracing::debug!(path = %path.display(), "Log sink opened");

        Ok(Self {
            path,
            out: Mutex::new(Output {
                writer: file,
                torn: false,
            }),
        })
    }
}

impl<W> FileSink<W> {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn open_error(path: &Path, err: std::io::Error) -> SinkError {
    SinkError::Open {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

#[async_trait]
impl<W> LogSink for FileSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn append(&self, line: &str) -> Result<(), SinkError> {
        let mut out = self.out.lock().await;

        let mut buf = Vec::with_capacity(line.len() + 2);
        if out.torn {
            buf.push(b'\n');
        }
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');

        // tokio defers the actual write to a blocking task until flushed
        let written = match out.writer.write_all(&buf).await {
            Ok(()) => out.writer.flush().await,
            Err(e) => Err(e),
        };

        out.torn = written.is_err();
        written.map_err(|e| SinkError::Write(format!("{}: {}", self.path.display(), e)))
    }
}
