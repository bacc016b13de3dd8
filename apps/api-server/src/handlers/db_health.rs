//! Database health check endpoint.

use actix_web::{HttpResponse, web};
use alerts_shared::DbHealthResponse;

use crate::middleware::error::AppResult;
use crate::observability::RequestId;
use crate::state::AppState;

/// Database health check - runs `SELECT 1` through the configured probe.
///
/// GET /api/v1/db-health
pub async fn db_health_check(
    state: web::Data<AppState>,
    request_id: RequestId,
) -> AppResult<HttpResponse> {
    state.db_probe.ping().await?;

    Ok(HttpResponse::Ok().json(DbHealthResponse {
        status: "ok".to_string(),
        message: "Database connection successful".to_string(),
        request_id: request_id.to_string(),
    }))
}
