//! Login endpoint
//!
//! Single-user credential check against compiled-in values. No sessions and
//! no tokens; the UI only gates its edit controls on the 200.

use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::{ApiError, ApiResult};

const USERNAME: &str = "admin";
const PASSWORD: &str = "songbook";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/login
pub async fn login(Json(request): Json<LoginRequest>) -> ApiResult<Json<Value>> {
    if request.username == USERNAME && request.password == PASSWORD {
        Ok(Json(json!({ "success": true })))
    } else {
        warn!("Rejected login for username {:?}", request.username);
        Err(ApiError::Unauthorized)
    }
}
