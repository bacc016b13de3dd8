use std::sync::Arc;

use crate::domain::{ErrorRecord, RequestRecord, ResponseRecord, Severity};
use crate::error::SinkError;

use super::SinkSet;

/// Writes request, response and error records to their sinks.
///
/// Records are built by the transport adapter; the recorder only routes and
/// formats them. It never touches the request or response itself.
#[derive(Clone)]
pub struct Recorder {
    sinks: Arc<SinkSet>,
}

impl Recorder {
    pub fn new(sinks: Arc<SinkSet>) -> Self {
        Self { sinks }
    }

    /// Full request snapshot to the `request` sink.
    pub async fn record_request(&self, record: &RequestRecord) -> Result<(), SinkError> {
        self.sinks
            .request()
            .write(Severity::Info, &record.correlation_id, &record.message())
            .await?;
        Ok(())
    }

    /// Full response snapshot to the `request` sink, summary line to `info`.
    ///
    /// Both writes are attempted; the first failure is returned.
    pub async fn record_response(&self, record: &ResponseRecord) -> Result<(), SinkError> {
        let full = self
            .sinks
            .request()
            .write(Severity::Info, &record.correlation_id, &record.message())
            .await;
        let summary = self
            .sinks
            .info()
            .write(Severity::Info, &record.correlation_id, &record.summary())
            .await;

        full.and(summary).map(|_| ())
    }

    /// Failure snapshot to the `error` sink.
    pub async fn record_error(&self, record: &ErrorRecord) -> Result<(), SinkError> {
        self.sinks
            .error()
            .write(Severity::Error, &record.correlation_id, &record.message())
            .await?;
        Ok(())
    }
}
