//! Domain types - identifiers, severities and the records written per request.

mod correlation;
mod record;
mod severity;

pub use correlation::CorrelationId;
pub use record::{
    ElapsedMs, ErrorRecord, HeaderSnapshot, RequestBody, RequestRecord, ResponseRecord,
    UNPARSEABLE_BODY,
};
pub use severity::{ParseSeverityError, Severity};
