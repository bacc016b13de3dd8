//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use alerts_core::Severity;
use alerts_infra::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Prefix every route is mounted under, e.g. `/api/v1`.
    pub api_prefix: String,
    pub project_name: String,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// Where and how verbosely the request sinks write.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum severity for all three sinks.
    pub level: Severity,
    /// Base directory; a dated subdirectory is created under it.
    pub dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://data/trading_alerts.db".to_string()),
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            api_prefix: normalize_prefix(
                &env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),
            ),
            project_name: env::var("PROJECT_NAME")
                .unwrap_or_else(|_| "Trading Alerts API".to_string()),
            database,
            logging: LoggingConfig::from_env(),
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            level: env::var("LOG_LEVEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Severity::Debug),
            dir: env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("logs")),
        }
    }
}

/// `api/v1/` -> `/api/v1`, `/` -> ``.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
