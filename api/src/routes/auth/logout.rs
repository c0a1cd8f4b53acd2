use actix_web::{web, HttpResponse};

use ck_core::RevocationReason;

use crate::app::AppState;
use crate::dto::{LogoutRequest, LogoutResponse};
use crate::middleware::AuthContext;

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the access token that authenticated the request and, when the
/// body carries one, the matching refresh token. Each side is attempted
/// independently.
pub async fn logout(
    state: web::Data<AppState>,
    auth: AuthContext,
    body: Option<web::Json<LogoutRequest>>,
) -> HttpResponse {
    let request = body.map(web::Json::into_inner).unwrap_or_default();

    let result = state
        .credentials
        .revoke_pair(
            Some(auth.token()),
            request.refresh_token.as_deref(),
            RevocationReason::Logout,
        )
        .await;

    HttpResponse::Ok().json(LogoutResponse {
        access_revoked: result.access_revoked,
        refresh_revoked: result.refresh_revoked,
    })
}
