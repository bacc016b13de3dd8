//! Database connection management and the health probe.

mod connections;

#[cfg(feature = "database")]
mod probe;

pub use connections::DatabaseConfig;

#[cfg(feature = "database")]
pub use connections::DatabaseConnections;
#[cfg(feature = "database")]
pub use probe::SqlProbe;
