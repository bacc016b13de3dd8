//! In-memory sink - used by tests to inspect what the middleware wrote.

use async_trait::async_trait;
use tokio::sync::RwLock;

use alerts_core::SinkError;
use alerts_core::ports::LogSink;

/// Sink that keeps every line in a vector.
///
/// Note: lines are lost on process restart.
pub struct InMemorySink {
    lines: RwLock<Vec<String>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self {
            lines: RwLock::new(Vec::new()),
        }
    }

    /// Copy of all lines written so far, oldest first.
    pub async fn lines(&self) -> Vec<String> {
        self.lines.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.lines.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.lines.read().await.is_empty()
    }
}

impl Default for InMemorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogSink for InMemorySink {
    async fn append(&self, line: &str) -> Result<(), SinkError> {
        self.lines.write().await.push(line.to_string());
        Ok(())
    }
}
