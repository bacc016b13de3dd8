use async_trait::async_trait;

use crate::error::SinkError;

/// Append-only destination for formatted log lines (file, memory, ...).
///
/// Implementations must make each `append` atomic: concurrent callers never
/// see their lines interleaved or split.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Append one line. The line carries no trailing newline.
    async fn append(&self, line: &str) -> Result<(), SinkError>;
}
