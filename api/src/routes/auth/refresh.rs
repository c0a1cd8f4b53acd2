use actix_web::{web, HttpResponse};

use ck_core::TokenError;

use crate::app::AppState;
use crate::dto::{RefreshTokenRequest, TokenResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges a refresh token for a new pair. The presented token is consumed.
///
/// # Request Body
///
/// ```json
/// {
///     "refresh_token": "eyJ..."
/// }
/// ```
///
/// Role and permissions carry over unchanged from the presented token.
///
/// # Errors
/// - 401 Unauthorized: missing, invalid or expired refresh token
/// - 403 Forbidden: revoked token, or an access token presented
/// - 500 Internal Server Error: no signing key available
pub async fn refresh(
    state: web::Data<AppState>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, ApiError> {
    if request.refresh_token.trim().is_empty() {
        return Err(TokenError::MissingToken.into());
    }

    let pair = state
        .credentials
        .refresh(&request.refresh_token, None)
        .await?;

    Ok(HttpResponse::Ok().json(TokenResponse::from(pair)))
}
