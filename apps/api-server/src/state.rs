//! Application state - shared across all handlers.

use std::sync::Arc;

use alerts_core::ports::DatabaseProbe;
use alerts_infra::DatabaseConfig;

#[cfg(feature = "database")]
use alerts_infra::SqlProbe;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db_probe: Arc<dyn DatabaseProbe>,
}

/// Probe used when the server is built without database support.
#[cfg(not(feature = "database"))]
pub struct UnconfiguredProbe;

#[cfg(not(feature = "database"))]
#[async_trait::async_trait]
impl DatabaseProbe for UnconfiguredProbe {
    async fn ping(&self) -> Result<(), alerts_core::ProbeError> {
        tracing::warn!("Database support not compiled in - db-health always fails");
        Err(alerts_core::ProbeError::NotConfigured)
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub fn new(db_config: &DatabaseConfig) -> Self {
        // The pool is opened lazily by the first db-health call
        #[cfg(feature = "database")]
        let db_probe: Arc<dyn DatabaseProbe> = Arc::new(SqlProbe::new(db_config.clone()));

        #[cfg(not(feature = "database"))]
        let db_probe: Arc<dyn DatabaseProbe> = {
            tracing::info!(
                url = %db_config.url,
                "Running without database feature - db-health is disabled"
            );
            Arc::new(UnconfiguredProbe)
        };

        tracing::info!("Application state initialized");

        Self::with_probe(db_probe)
    }

    pub fn with_probe(db_probe: Arc<dyn DatabaseProbe>) -> Self {
        Self { db_probe }
    }
}
