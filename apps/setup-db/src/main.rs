//! One-shot bootstrap: create the SQLite database file and today's log
//! directories so the server starts against a prepared environment.

use std::env;
use std::path::{Path, PathBuf};

use alerts_infra::{DatabaseConfig, DatabaseConnections, LogLayout};
use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let url = env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/trading_alerts.db".to_string());
    let log_dir = env::var("LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("logs"));

    let layout = LogLayout::today(&log_dir);
    layout
        .create_dirs()
        .await
        .with_context(|| format!("creating log directories under {}", log_dir.display()))?;
    tracing::info!(root = %layout.root().display(), "Log directories ready");

    if let Some(file) = sqlite_file(&url) {
        if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }

    let config = DatabaseConfig::new(create_mode(&url));
    // Connecting in rwc mode is what creates the file
    DatabaseConnections::init(&config)
        .await
        .with_context(|| format!("connecting to {url}"))?;

    tracing::info!("Database ready at {}", url);
    Ok(())
}

/// Path of the database file for `sqlite:` URLs; `None` for in-memory and
/// non-SQLite databases.
fn sqlite_file(url: &str) -> Option<&Path> {
    let rest = url.strip_prefix("sqlite:")?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(Path::new(path))
    }
}

/// SQLite only creates a missing file when asked to.
fn create_mode(url: &str) -> String {
    if url.starts_with("sqlite:") && !url.contains('?') {
        format!("{url}?mode=rwc")
    } else {
        url.to_string()
    }
}
