use async_trait::async_trait;

use crate::error::ProbeError;

/// Database reachability check used by the health endpoint.
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    /// Run a trivial round-trip query against the database.
    async fn ping(&self) -> Result<(), ProbeError>;
}
