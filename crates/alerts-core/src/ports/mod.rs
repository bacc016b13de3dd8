//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod health;
mod log_sink;

pub use health::DatabaseProbe;
pub use log_sink::LogSink;
