//! Request logging middleware - correlation id, request/response/error records.

use actix_web::{
    Error, HttpMessage,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    error::PayloadError,
    http::header::{HeaderMap, HeaderName, HeaderValue},
    web,
};
use alerts_core::domain::{HeaderSnapshot, RequestBody, RequestRecord};
use alerts_core::{CorrelationId, Recorder};
use futures::{FutureExt, StreamExt, stream};
use std::future::{Future, Ready, ready};
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::rc::Rc;

use super::REQUEST_ID_HEADER;
use super::dispatch::{self, Failure};

/// Middleware that gives every request a fresh correlation id and records
/// it to the request sinks.
///
/// - the id is stored in request extensions (see [`super::RequestId`]),
/// - the request is recorded before the handler runs,
/// - exactly one response or error record follows,
/// - successful responses carry the id in `X-Request-ID`.
///
/// Failures are re-raised unchanged: an `Err` from the wrapped service is
/// returned as is and a panic is resumed with its original payload. Neither
/// path has a response to attach the header to.
pub struct RequestLogging {
    recorder: Recorder,
    body_limit: usize,
}

/// Largest body captured for the request record, matching actix's default
/// `JsonConfig` limit. Longer bodies are recorded as unparseable and passed
/// to the handler untouched.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

impl RequestLogging {
    pub fn new(recorder: Recorder) -> Self {
        Self {
            recorder,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLogging
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestLoggingService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggingService {
            service: Rc::new(service),
            recorder: self.recorder.clone(),
            body_limit: self.body_limit,
        }))
    }
}

pub struct RequestLoggingService<S> {
    service: Rc<S>,
    recorder: Recorder,
    body_limit: usize,
}

impl<S, B> Service<ServiceRequest> for RequestLoggingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let recorder = self.recorder.clone();
        let body_limit = self.body_limit;

        Box::pin(async move {
            let request_id = CorrelationId::new();
            req.extensions_mut().insert(request_id);
            tracing::debug!(request_id = %request_id, "Processing request");

            let record = capture_request(&mut req, request_id, body_limit).await;
            let path = req.path().to_string();
            let handling = dispatch::begin(recorder, &record, path).await;

            let outcome = AssertUnwindSafe(async { service.call(req).await })
                .catch_unwind()
                .await;
            let elapsed = handling.elapsed();

            match outcome {
                Ok(Ok(mut res)) => {
                    res.headers_mut().insert(
                        HeaderName::from_static(REQUEST_ID_HEADER),
                        HeaderValue::from_str(&request_id.to_string())
                            .unwrap_or_else(|_| HeaderValue::from_static("unknown")),
                    );
                    let headers = snapshot(res.headers());
                    handling
                        .respond(res.status().as_u16(), headers, elapsed)
                        .await;
                    Ok(res)
                }
                Ok(Err(err)) => {
                    handling
                        .fail(Failure::from_service_error(&err), elapsed)
                        .await;
                    Err(err)
                }
                Err(panic) => {
                    handling.fail(Failure::from_panic(&*panic), elapsed).await;
                    std::panic::resume_unwind(panic)
                }
            }
        })
    }
}

/// Snapshot the request. Mutating methods have their body buffered, parsed
/// and put back so the handler can still read it.
async fn capture_request(
    req: &mut ServiceRequest,
    request_id: CorrelationId,
    body_limit: usize,
) -> RequestRecord {
    let method = req.method().as_str().to_string();

    let body = if RequestBody::is_captured_for(&method) {
        match buffer_payload(req, body_limit).await {
            Captured::Complete(bytes) => RequestBody::capture(&method, &bytes),
            Captured::Oversized => {
                tracing::debug!(
                    request_id = %request_id,
                    "Request body exceeds {} bytes, not captured",
                    body_limit
                );
                RequestBody::Unparseable
            }
            Captured::Failed(e) => {
                tracing::debug!(request_id = %request_id, "Request body unreadable: {}", e);
                RequestBody::Unparseable
            }
        }
    } else {
        RequestBody::Absent
    };

    let url = {
        let info = req.connection_info();
        let path_and_query = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        format!("{}://{}{}", info.scheme(), info.host(), path_and_query)
    };

    RequestRecord {
        correlation_id: request_id,
        method,
        url,
        headers: snapshot(req.headers()),
        body,
        client_address: req.peer_addr().map(|addr| addr.ip().to_string()),
    }
}

enum Captured {
    Complete(web::Bytes),
    /// More than the limit arrived; the rest is left in the stream.
    Oversized,
    Failed(PayloadError),
}

/// Drain the payload and replace it with an in-memory copy.
///
/// Buffering stops once `limit` is exceeded: the handler then gets the
/// buffered prefix followed by the unread remainder of the original stream.
/// On a stream error the bytes read so far are replayed.
async fn buffer_payload(req: &mut ServiceRequest, limit: usize) -> Captured {
    let mut payload = req.take_payload();
    let mut body = web::BytesMut::new();

    while let Some(chunk) = payload.next().await {
        match chunk {
            Ok(chunk) => {
                body.extend_from_slice(&chunk);
                if body.len() > limit {
                    let head = body.freeze();
                    let rest = stream::once(async move { Ok::<_, PayloadError>(head) }).chain(payload);
                    req.set_payload(Payload::Stream {
                        payload: Box::pin(rest),
                    });
                    return Captured::Oversized;
                }
            }
            Err(e) => {
                req.set_payload(replay(body.freeze()));
                return Captured::Failed(e);
            }
        }
    }

    let body = body.freeze();
    req.set_payload(replay(body.clone()));
    Captured::Complete(body)
}

fn replay(body: web::Bytes) -> Payload {
    let (_, mut payload) = actix_http::h1::Payload::create(true);
    payload.unread_data(body);
    Payload::from(payload)
}

fn snapshot(headers: &HeaderMap) -> HeaderSnapshot {
    HeaderSnapshot::from_pairs(
        headers
            .iter()
            .map(|(name, value)| (name.as_str(), String::from_utf8_lossy(value.as_bytes()))),
    )
}
