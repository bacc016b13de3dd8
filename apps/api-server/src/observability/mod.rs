//! Observability module - correlation ids and request logging.

mod dispatch;
mod request_id;
mod request_logging;

pub use request_id::{REQUEST_ID_HEADER, RequestId};
pub use request_logging::RequestLogging;
