//! # Alerts Infrastructure
//!
//! Concrete implementations of the ports defined in `alerts-core`.
//! This crate contains the log sink backends and the database probe.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, sinks only
//! - `database` - SQLite/PostgreSQL health probe via SeaORM

pub mod database;
pub mod sink;

// Re-exports
pub use database::DatabaseConfig;
pub use sink::{FileSink, InMemorySink, LogLayout};

#[cfg(feature = "database")]
pub use database::{DatabaseConnections, SqlProbe};
