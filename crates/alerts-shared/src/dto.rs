//! Data Transfer Objects - response bodies of the health endpoints.

use serde::{Deserialize, Serialize};

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub request_id: String,
}

/// Body of `GET /db-health` when the database answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbHealthResponse {
    pub status: String,
    pub message: String,
    pub request_id: String,
}
