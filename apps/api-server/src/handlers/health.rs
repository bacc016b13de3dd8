//! Health check endpoint.

use actix_web::HttpResponse;
use alerts_shared::HealthResponse;

use crate::observability::RequestId;

/// Health check endpoint - returns server status.
///
/// GET /api/v1/health
pub async fn health_check(request_id: RequestId) -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        request_id: request_id.to_string(),
    };

    HttpResponse::Ok().json(response)
}
