//! Sink routing and the write side of request recording.
//!
//! The correlation id travels as an argument of every write. Sinks hold no
//! per-request state, so concurrent requests can share them freely.

mod recorder;
mod sink;

pub use recorder::Recorder;
pub use sink::{LogLine, Sink, SinkName, SinkSet};
