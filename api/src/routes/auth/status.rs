use actix_web::{web, HttpResponse};

use crate::app::AppState;
use crate::dto::StatusResponse;
use crate::handlers::ApiError;
use crate::middleware::AuthContext;

/// Role allowed to read key and revocation diagnostics
pub const ADMIN_ROLE: &str = "admin";

/// Handler for GET /api/v1/auth/status
///
/// Key-store status and revocation statistics. Never includes key material.
///
/// # Errors
/// - 401 Unauthorized: missing or invalid access token
/// - 403 Forbidden: caller does not hold the admin role
pub async fn status(state: web::Data<AppState>, auth: AuthContext) -> Result<HttpResponse, ApiError> {
    if !auth.has_role(ADMIN_ROLE) {
        return Err(ApiError::Forbidden(format!(
            "subject {} lacks role {}",
            auth.subject_id, ADMIN_ROLE
        )));
    }

    Ok(HttpResponse::Ok().json(StatusResponse {
        keys: state.credentials.key_status(),
        revocation: state.credentials.revocation_stats().await,
    }))
}
