//! HTTP handlers and route configuration.

mod db_health;
mod health;

use actix_web::{HttpRequest, HttpResponse, web};

use crate::middleware::error::{AppError, AppResult};

/// Configure all application routes under `prefix`.
pub fn configure_routes(cfg: &mut web::ServiceConfig, prefix: &str) {
    cfg.service(
        web::scope(prefix)
            .route("/health", web::get().to(health::health_check))
            .route("/db-health", web::get().to(db_health::db_health_check)),
    );
}

/// Fallback for unmatched routes.
pub async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(req.path().to_string()))
}
