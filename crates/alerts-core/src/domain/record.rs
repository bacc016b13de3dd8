//! Records written to the sinks for each request.
//!
//! Wire names follow the service's log format: `request_id`, `client`,
//! `process_time_ms`.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

use super::CorrelationId;

/// Marker written in place of a mutating request's body that is not valid JSON.
pub const UNPARSEABLE_BODY: &str = "Could not parse request body";

/// Body of a request as seen by the recorder.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Not captured (non-mutating method).
    Absent,
    /// Captured but not valid JSON.
    Unparseable,
    Parsed(serde_json::Value),
}

impl RequestBody {
    /// Methods whose body is captured.
    pub fn is_captured_for(method: &str) -> bool {
        matches!(method, "POST" | "PUT" | "PATCH")
    }

    /// Interpret raw body bytes for the given method.
    ///
    /// An empty body on a mutating method is unparseable, not absent.
    pub fn capture(method: &str, bytes: &[u8]) -> Self {
        if !Self::is_captured_for(method) {
            return RequestBody::Absent;
        }
        match serde_json::from_slice(bytes) {
            Ok(value) => RequestBody::Parsed(value),
            Err(_) => RequestBody::Unparseable,
        }
    }
}

impl Serialize for RequestBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RequestBody::Absent => serializer.serialize_none(),
            RequestBody::Unparseable => serializer.serialize_str(UNPARSEABLE_BODY),
            RequestBody::Parsed(value) => value.serialize(serializer),
        }
    }
}

/// Header map snapshot with lowercase names.
///
/// Repeated headers are joined with `", "`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HeaderSnapshot(BTreeMap<String, String>);

impl HeaderSnapshot {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in pairs {
            let name = name.as_ref().to_ascii_lowercase();
            map.entry(name)
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value.as_ref());
                })
                .or_insert_with(|| value.as_ref().to_string());
        }
        Self(map)
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Wall-clock milliseconds, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ElapsedMs(f64);

impl ElapsedMs {
    pub fn from_duration(elapsed: Duration) -> Self {
        let ms = elapsed.as_secs_f64() * 1000.0;
        Self((ms * 100.0).round() / 100.0)
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for ElapsedMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}ms", self.0)
    }
}

/// Snapshot of an inbound request, taken before the handler runs.
#[derive(Debug, Clone, Serialize)]
pub struct RequestRecord {
    #[serde(rename = "request_id")]
    pub correlation_id: CorrelationId,
    pub method: String,
    pub url: String,
    pub headers: HeaderSnapshot,
    pub body: RequestBody,
    #[serde(rename = "client")]
    pub client_address: Option<String>,
}

impl RequestRecord {
    pub fn message(&self) -> String {
        format!("Request: {}", to_json(self))
    }
}

/// Snapshot of a handler's response.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseRecord {
    #[serde(rename = "request_id")]
    pub correlation_id: CorrelationId,
    pub method: String,
    pub url: String,
    #[serde(skip)]
    pub path: String,
    pub status_code: u16,
    #[serde(rename = "process_time_ms")]
    pub elapsed_ms: ElapsedMs,
    pub headers: HeaderSnapshot,
}

impl ResponseRecord {
    pub fn message(&self) -> String {
        format!("Response: {}", to_json(self))
    }

    /// One-line form for the info sink: `GET /api/v1/health 200 0.42ms`.
    pub fn summary(&self) -> String {
        format!(
            "{} {} {} {}",
            self.method, self.path, self.status_code, self.elapsed_ms
        )
    }
}

/// Snapshot of a failure that escaped the handler.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    #[serde(rename = "request_id")]
    pub correlation_id: CorrelationId,
    pub method: String,
    pub url: String,
    #[serde(rename = "process_time_ms")]
    pub elapsed_ms: ElapsedMs,
    pub error: String,
    pub trace: Vec<String>,
}

impl ErrorRecord {
    pub fn message(&self) -> String {
        format!("Unhandled exception: {}", to_json(self))
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("{{\"serialization_error\":\"{e}\"}}"))
}
