//! Request ID extractor - exposes the correlation id to handlers.

use actix_web::HttpMessage;
use alerts_core::CorrelationId;
use std::fmt;
use std::future::{Ready, ready};

/// Header name for request ID (`X-Request-ID`), lowercase as stored on the wire.
pub static REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id of the request being handled.
///
/// `RequestLogging` mints the id and stores it in the request extensions;
/// this extractor reads it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub CorrelationId);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Extractor to get request ID in handlers.
impl actix_web::FromRequest for RequestId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let id = req.extensions().get::<CorrelationId>().copied().unwrap_or_else(|| {
            // Only reachable when RequestLogging is not mounted
            let id = CorrelationId::new();
            tracing::debug!(request_id = %id, "No correlation id on request, minted one");
            id
        });

        ready(Ok(RequestId(id)))
    }
}
