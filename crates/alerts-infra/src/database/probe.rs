//! `SELECT 1` health probe over a lazily opened pool.

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DbConn, Statement};
use tokio::sync::Mutex;

use alerts_core::ProbeError;
use alerts_core::ports::DatabaseProbe;

use super::{DatabaseConfig, DatabaseConnections};

const PING_SQL: &str = "SELECT 1 AS ok";

/// Database probe backed by SeaORM.
///
/// The pool is opened on the first ping, not at startup, so an unreachable
/// database never blocks boot. A failed connect is retried on the next ping.
pub struct SqlProbe {
    config: Option<DatabaseConfig>,
    conn: Mutex<Option<DbConn>>,
}

impl SqlProbe {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config: Some(config),
            conn: Mutex::new(None),
        }
    }

    /// Probe over an already open connection.
    pub fn with_connection(conn: DbConn) -> Self {
        Self {
            config: None,
            conn: Mutex::new(Some(conn)),
        }
    }

    async fn connection(&self) -> Result<DbConn, ProbeError> {
        let mut slot = self.conn.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let config = self.config.as_ref().ok_or(ProbeError::NotConfigured)?;
        let connections = DatabaseConnections::init(config).await.map_err(|e| {
            tracing::warn!("Database connect failed: {}", e);
            ProbeError::Connection(e.to_string())
        })?;

        *slot = Some(connections.main.clone());
        Ok(connections.main)
    }
}

#[async_trait]
impl DatabaseProbe for SqlProbe {
    async fn ping(&self) -> Result<(), ProbeError> {
        let conn = self.connection().await?;
        let stmt = Statement::from_string(conn.get_database_backend(), PING_SQL);

        let row = conn
            .query_one(stmt)
            .await
            .map_err(|e| ProbeError::Connection(e.to_string()))?
            .ok_or_else(|| ProbeError::UnexpectedResult("no rows returned".to_string()))?;

        let value: i32 = row
            .try_get("", "ok")
            .map_err(|e| ProbeError::UnexpectedResult(e.to_string()))?;

        if value != 1 {
            return Err(ProbeError::UnexpectedResult(format!(
                "SELECT 1 returned {value}"
            )));
        }

        Ok(())
    }
}
