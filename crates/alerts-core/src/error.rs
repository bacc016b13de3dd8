//! Domain-level error types.

use thiserror::Error;

/// Failures of a log sink backend.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to open sink at {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Sink write failed: {0}")]
    Write(String),
}

/// Failures of a database health probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("{0}")]
    Connection(String),

    #[error("unexpected result: {0}")]
    UnexpectedResult(String),

    #[error("database is not configured")]
    NotConfigured,
}
