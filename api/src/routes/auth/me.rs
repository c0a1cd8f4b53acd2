use actix_web::HttpResponse;

use crate::dto::IdentityResponse;
use crate::middleware::AuthContext;

/// Handler for GET /api/v1/auth/me
pub async fn me(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(IdentityResponse::from(&auth.identity))
}
