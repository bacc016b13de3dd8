//! Per-request dispatch lifecycle.
//!
//! ```text
//! START -> REQUEST_LOGGED -> HANDLING -> RESPONSE_LOGGED | ERROR_LOGGED -> DONE
//! ```
//!
//! [`begin`] covers the first two transitions and hands back a [`Handling`]
//! scope. `Handling::respond` and `Handling::fail` consume the scope, so a
//! request reaches exactly one terminal record. A scope dropped without
//! either (the transport cancelled the request) writes an abandonment
//! error record on a best-effort basis.

use std::any::Any;
use std::time::Instant;

use alerts_core::domain::{ElapsedMs, ErrorRecord, HeaderSnapshot, RequestRecord, ResponseRecord};
use alerts_core::{CorrelationId, Recorder};

/// Error text recorded when a request never reached a terminal state.
pub const ABANDONED: &str = "request abandoned before completion";

/// Description of a failure that escaped the handler.
#[derive(Debug, Clone)]
pub struct Failure {
    pub description: String,
    pub trace: Vec<String>,
}

impl Failure {
    /// An `Err` returned by the wrapped service.
    pub fn from_service_error(err: &actix_web::Error) -> Self {
        Self {
            description: err.to_string(),
            trace: vec![
                format!("{:?}", err),
                format!("maps to status {}", err.as_response_error().status_code()),
            ],
        }
    }

    /// A panic payload caught while polling the wrapped service.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());

        Self {
            description: format!("handler panicked: {message}"),
            trace: vec!["panic unwound out of the request handler".to_string()],
        }
    }

    fn abandoned() -> Self {
        Self {
            description: ABANDONED.to_string(),
            trace: vec!["dispatch future dropped before the handler finished".to_string()],
        }
    }
}

/// Log the request record and start the handling clock.
///
/// The scope is armed before the request record is written: if the caller
/// is dropped while that write is pending, the abandonment record still
/// follows. The clock restarts once the write returns, immediately before
/// the caller invokes the handler.
pub async fn begin(recorder: Recorder, record: &RequestRecord, path: String) -> Handling {
    let mut handling = Handling {
        recorder,
        correlation_id: record.correlation_id,
        method: record.method.clone(),
        url: record.url.clone(),
        path,
        started: Instant::now(),
        settled: false,
    };

    if let Err(e) = handling.recorder.record_request(record).await {
        tracing::warn!(request_id = %record.correlation_id, "Request record not written: {}", e);
    }

    handling.started = Instant::now();
    handling
}

/// A request whose handler is running.
pub struct Handling {
    recorder: Recorder,
    correlation_id: CorrelationId,
    method: String,
    url: String,
    path: String,
    started: Instant,
    settled: bool,
}

impl Handling {
    /// Wall-clock time since the handler was invoked.
    pub fn elapsed(&self) -> ElapsedMs {
        ElapsedMs::from_duration(self.started.elapsed())
    }

    /// Terminal: the handler produced a response.
    pub async fn respond(mut self, status_code: u16, headers: HeaderSnapshot, elapsed: ElapsedMs) {
        self.settled = true;

        let record = ResponseRecord {
            correlation_id: self.correlation_id,
            method: std::mem::take(&mut self.method),
            url: std::mem::take(&mut self.url),
            path: std::mem::take(&mut self.path),
            status_code,
            elapsed_ms: elapsed,
            headers,
        };

        if let Err(e) = self.recorder.record_response(&record).await {
            tracing::warn!(request_id = %record.correlation_id, "Response record not written: {}", e);
        }
    }

    /// Terminal: the handler failed. The caller re-raises the original failure.
    pub async fn fail(mut self, failure: Failure, elapsed: ElapsedMs) {
        self.settled = true;

        let record = self.error_record(failure, elapsed);
        if let Err(e) = self.recorder.record_error(&record).await {
            tracing::warn!(request_id = %record.correlation_id, "Error record not written: {}", e);
        }
    }

    fn error_record(&mut self, failure: Failure, elapsed: ElapsedMs) -> ErrorRecord {
        ErrorRecord {
            correlation_id: self.correlation_id,
            method: std::mem::take(&mut self.method),
            url: std::mem::take(&mut self.url),
            elapsed_ms: elapsed,
            error: failure.description,
            trace: failure.trace,
        }
    }
}

impl Drop for Handling {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let elapsed = self.elapsed();
        let record = self.error_record(Failure::abandoned(), elapsed);
        tracing::warn!(request_id = %record.correlation_id, "Request abandoned mid-flight");

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let recorder = self.recorder.clone();
                runtime.spawn(async move {
                    if let Err(e) = recorder.record_error(&record).await {
                        tracing::warn!(
                            request_id = %record.correlation_id,
                            "Abandonment record not written: {}",
                            e
                        );
                    }
                });
            }
            Err(_) => {
                tracing::warn!(
                    request_id = %record.correlation_id,
                    "No runtime to write abandonment record"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerts_core::domain::RequestBody;
    use alerts_core::ports::LogSink;
    use alerts_core::{Severity, SinkError, SinkSet};
    use alerts_infra::InMemorySink;
    use std::sync::Arc;
    use std::time::Duration;

    struct Sinks {
        info: Arc<InMemorySink>,
        error: Arc<InMemorySink>,
        request: Arc<InMemorySink>,
    }

    fn recorder() -> (Recorder, Sinks) {
        let sinks = Sinks {
            info: Arc::new(InMemorySink::new()),
            error: Arc::new(InMemorySink::new()),
            request: Arc::new(InMemorySink::new()),
        };
        let set = SinkSet::new(
            Severity::Debug,
            sinks.info.clone(),
            sinks.error.clone(),
            sinks.request.clone(),
        );
        (Recorder::new(Arc::new(set)), sinks)
    }

    fn request_record() -> RequestRecord {
        RequestRecord {
            correlation_id: CorrelationId::new(),
            method: "GET".into(),
            url: "http://localhost:8080/api/v1/health".into(),
            headers: HeaderSnapshot::default(),
            body: RequestBody::Absent,
            client_address: Some("127.0.0.1".into()),
        }
    }

    #[tokio::test]
    async fn test_respond_writes_one_response() {
        let (recorder, sinks) = recorder();
        let record = request_record();

        let handling = begin(recorder, &record, "/api/v1/health".into()).await;
        let elapsed = handling.elapsed();
        handling.respond(200, HeaderSnapshot::default(), elapsed).await;

        let lines = sinks.request.lines().await;
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(" - Request: "));
        assert!(lines[1].contains(" - Response: "));
        assert_eq!(sinks.info.len().await, 1);
        assert!(sinks.error.is_empty().await);
    }

    #[tokio::test]
    async fn test_fail_writes_one_error() {
        let (recorder, sinks) = recorder();
        let record = request_record();

        let handling = begin(recorder, &record, "/api/v1/health".into()).await;
        let failure = Failure {
            description: "worker gone".into(),
            trace: vec![],
        };
        let elapsed = handling.elapsed();
        handling.fail(failure, elapsed).await;

        let errors = sinks.error.lines().await;
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains(&record.correlation_id.to_string()));
        assert!(errors[0].contains("worker gone"));
        assert_eq!(sinks.request.len().await, 1);
        assert!(sinks.info.is_empty().await);
    }

    #[tokio::test]
    async fn test_drop_without_outcome_records_abandonment() {
        let (recorder, sinks) = recorder();
        let record = request_record();

        let handling = begin(recorder, &record, "/api/v1/health".into()).await;
        drop(handling);

        // The abandonment record is written by a spawned task
        tokio::time::sleep(Duration::from_millis(20)).await;

        let errors = sinks.error.lines().await;
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains(ABANDONED));
        assert!(sinks.info.is_empty().await);
    }

    /// Stores the line, then stalls before acknowledging the write.
    struct StallingSink(Arc<InMemorySink>);

    #[async_trait::async_trait]
    impl LogSink for StallingSink {
        async fn append(&self, line: &str) -> Result<(), SinkError> {
            self.0.append(line).await?;
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_drop_during_request_write_records_abandonment() {
        let request = Arc::new(InMemorySink::new());
        let error = Arc::new(InMemorySink::new());
        let set = SinkSet::new(
            Severity::Debug,
            Arc::new(InMemorySink::new()),
            error.clone(),
            Arc::new(StallingSink(request.clone())),
        );
        let recorder = Recorder::new(Arc::new(set));
        let record = request_record();

        let pending = tokio::time::timeout(
            Duration::from_millis(10),
            begin(recorder, &record, "/api/v1/health".into()),
        )
        .await;
        assert!(pending.is_err());

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(request.len().await, 1);
        let errors = error.lines().await;
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains(&record.correlation_id.to_string()));
        assert!(errors[0].contains(ABANDONED));
    }

    #[test]
    fn test_panic_payloads() {
        let from_str = Failure::from_panic(&"index out of bounds");
        assert_eq!(from_str.description, "handler panicked: index out of bounds");

        let owned: Box<dyn Any + Send> = Box::new(String::from("bad state"));
        let from_string = Failure::from_panic(&*owned);
        assert_eq!(from_string.description, "handler panicked: bad state");

        let opaque: Box<dyn Any + Send> = Box::new(7_u8);
        assert!(Failure::from_panic(&*opaque).description.contains("non-string"));
    }
}
