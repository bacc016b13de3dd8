//! # Alerts Core
//!
//! The domain layer of the Trading Alerts API.
//! Correlation ids, log records, sink routing and the ports infrastructure
//! must implement. No I/O happens in this crate.

pub mod domain;
pub mod error;
pub mod logging;
pub mod ports;

pub use domain::{CorrelationId, Severity};
pub use error::{ProbeError, SinkError};
pub use logging::{Recorder, SinkSet};
