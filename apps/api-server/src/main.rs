//! # Trading Alerts API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use alerts_core::Recorder;
use alerts_infra::LogLayout;
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use observability::RequestLogging;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env();

    // Initialize tracing
    telemetry::init_telemetry(&TelemetryConfig::from_env(&config.project_name));

    tracing::info!(
        "Starting {} on {}:{}",
        config.project_name,
        config.host,
        config.port
    );

    // Request sinks are opened once and shared by every worker
    let layout = LogLayout::today(&config.logging.dir);
    let sinks = layout.open(config.logging.level).await.map_err(|e| {
        tracing::error!("Cannot open request log sinks: {}", e);
        std::io::Error::other(e)
    })?;
    let recorder = Recorder::new(Arc::new(sinks));

    // Build application state
    let state = AppState::new(&config.database);
    let api_prefix = config.api_prefix.clone();

    // Start HTTP server
    HttpServer::new(move || {
        let api_prefix = api_prefix.clone();
        App::new()
            .wrap(middleware::cors::permissive())
            .wrap(RequestLogging::new(recorder.clone()))
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(move |cfg| handlers::configure_routes(cfg, &api_prefix))
            .default_service(web::to(handlers::not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
