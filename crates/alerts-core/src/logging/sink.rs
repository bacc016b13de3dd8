use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::domain::{CorrelationId, Severity};
use crate::error::SinkError;
use crate::ports::LogSink;

/// The three request-observability channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkName {
    Info,
    Error,
    Request,
}

impl SinkName {
    pub const ALL: [SinkName; 3] = [SinkName::Info, SinkName::Error, SinkName::Request];

    pub fn as_str(&self) -> &'static str {
        match self {
            SinkName::Info => "info",
            SinkName::Error => "error",
            SinkName::Request => "request",
        }
    }
}

impl fmt::Display for SinkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One formatted sink line:
/// `<timestamp> - <sink> - <severity> - <correlation id> - <message>`.
pub struct LogLine<'a> {
    pub timestamp: DateTime<Local>,
    pub sink: SinkName,
    pub severity: Severity,
    pub correlation_id: &'a CorrelationId,
    pub message: &'a str,
}

impl fmt::Display for LogLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {} - {} - {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S,%3f"),
            self.sink,
            self.severity,
            self.correlation_id,
            self.message
        )
    }
}

/// A named backend with a minimum severity.
#[derive(Clone)]
pub struct Sink {
    name: SinkName,
    threshold: Severity,
    backend: Arc<dyn LogSink>,
}

impl Sink {
    pub fn new(name: SinkName, threshold: Severity, backend: Arc<dyn LogSink>) -> Self {
        Self {
            name,
            threshold,
            backend,
        }
    }

    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.threshold
    }

    /// Format and append one record.
    ///
    /// Returns `Ok(false)` when the record is below the threshold and was dropped.
    pub async fn write(
        &self,
        severity: Severity,
        correlation_id: &CorrelationId,
        message: &str,
    ) -> Result<bool, SinkError> {
        if !self.enabled(severity) {
            return Ok(false);
        }

        let line = LogLine {
            timestamp: Local::now(),
            sink: self.name,
            severity,
            correlation_id,
            message,
        }
        .to_string();

        self.backend.append(&line).await?;
        Ok(true)
    }
}

/// The process-wide set of sinks, built once at startup and shared by reference.
#[derive(Clone)]
pub struct SinkSet {
    info: Sink,
    error: Sink,
    request: Sink,
}

impl SinkSet {
    /// Build the set with one threshold shared by all three sinks.
    pub fn new(
        threshold: Severity,
        info: Arc<dyn LogSink>,
        error: Arc<dyn LogSink>,
        request: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            info: Sink::new(SinkName::Info, threshold, info),
            error: Sink::new(SinkName::Error, threshold, error),
            request: Sink::new(SinkName::Request, threshold, request),
        }
    }

    pub fn info(&self) -> &Sink {
        &self.info
    }

    pub fn error(&self) -> &Sink {
        &self.error
    }

    pub fn request(&self) -> &Sink {
        &self.request
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Backend that keeps lines in memory.
    #[derive(Default)]
    pub(crate) struct Lines(Mutex<Vec<String>>);

    impl Lines {
        pub(crate) fn snapshot(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LogSink for Lines {
        async fn append(&self, line: &str) -> Result<(), SinkError> {
            self.0.lock().unwrap().push(line.to_string());
            Ok(())
        }
    }

    /// Backend whose storage is gone.
    pub(crate) struct Broken;

    #[async_trait]
    impl LogSink for Broken {
        async fn append(&self, _line: &str) -> Result<(), SinkError> {
            Err(SinkError::Write("disk unavailable".into()))
        }
    }

    #[test]
    fn test_line_format() {
        let id = CorrelationId::new();
        let line = LogLine {
            timestamp: Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap(),
            sink: SinkName::Request,
            severity: Severity::Info,
            correlation_id: &id,
            message: "Request: {}",
        };
        assert_eq!(
            line.to_string(),
            format!("2024-03-09 14:05:07,000 - request - INFO - {id} - Request: {{}}")
        );
    }

    #[tokio::test]
    async fn test_records_below_threshold_are_dropped() {
        let backend = Arc::new(Lines::default());
        let sink = Sink::new(SinkName::Info, Severity::Warning, backend.clone());
        let id = CorrelationId::new();

        assert!(!sink.write(Severity::Info, &id, "quiet").await.unwrap());
        assert!(sink.write(Severity::Error, &id, "loud").await.unwrap());

        let lines = backend.snapshot();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(&format!(" - info - ERROR - {id} - loud")));
    }

    #[tokio::test]
    async fn test_concurrent_writers_keep_their_own_ids() {
        let backend = Arc::new(Lines::default());
        let sink = Arc::new(Sink::new(SinkName::Request, Severity::Debug, backend.clone()));

        let mut handles = Vec::new();
        for _ in 0..64 {
            let sink = sink.clone();
            handles.push(tokio::spawn(async move {
                let id = CorrelationId::new();
                sink.write(Severity::Info, &id, &format!("owner={id}"))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let lines = backend.snapshot();
        assert_eq!(lines.len(), 64);
        for line in lines {
            let fields: Vec<&str> = line.splitn(5, " - ").collect();
            assert_eq!(fields[4], format!("owner={}", fields[3]));
        }
    }

    #[tokio::test]
    async fn test_backend_failure_is_reported() {
        let sink = Sink::new(SinkName::Error, Severity::Debug, Arc::new(Broken));
        let err = sink
            .write(Severity::Error, &CorrelationId::new(), "boom")
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::Write(_)));
    }
}
