//! Bearer token authentication middleware for protecting API endpoints.
//!
//! The middleware extracts the token from the `Authorization` header, runs it
//! through [`CredentialService::authenticate`] and injects the resolved
//! [`AuthContext`] into request extensions. Any failure short-circuits with
//! the mapped error response; the protected handler never runs.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use std::{
    fmt,
    future::{ready, Ready},
    ops::Deref,
    rc::Rc,
    sync::Arc,
};
use tracing::debug;

use ck_core::{CredentialService, Identity, TokenError};

use crate::handlers::error::ApiError;

/// Authenticated caller injected into requests
#[derive(Clone)]
pub struct AuthContext {
    pub identity: Identity,
    /// The bearer token as presented, needed to revoke it on logout
    token: String,
}

impl AuthContext {
    pub fn new(identity: Identity, token: impl Into<String>) -> Self {
        Self {
            identity,
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Deref for AuthContext {
    type Target = Identity;

    fn deref(&self) -> &Identity {
        &self.identity
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Authentication middleware factory
#[derive(Clone)]
pub struct CredentialAuth {
    credentials: Arc<CredentialService>,
}

impl CredentialAuth {
    pub fn new(credentials: Arc<CredentialService>) -> Self {
        Self { credentials }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CredentialAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = CredentialAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CredentialAuthMiddleware {
            service: Rc::new(service),
            credentials: self.credentials.clone(),
        }))
    }
}

/// Authentication middleware service
pub struct CredentialAuthMiddleware<S> {
    service: Rc<S>,
    credentials: Arc<CredentialService>,
}

impl<S, B> Service<ServiceRequest> for CredentialAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let credentials = self.credentials.clone();

        Box::pin(async move {
            let outcome = match extract_bearer_token(&req) {
                Some(token) => credentials
                    .authenticate(&token)
                    .await
                    .map(|identity| AuthContext::new(identity, token))
                    .map_err(ApiError::from),
                None => Err(ApiError::from(TokenError::MissingToken)),
            };

            match outcome {
                Ok(context) => {
                    debug!(subject_id = %context.subject_id, "Request authenticated");
                    req.extensions_mut().insert(context);
                    let response = service.call(req).await?;
                    Ok(response.map_into_left_body())
                }
                Err(err) => {
                    let response = err.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// Extracts the bearer token from the Authorization header
///
/// The scheme is matched case-insensitively; an empty token counts as absent.
pub fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::from(TokenError::MissingToken));

        ready(result)
    }
}

/// Extractor for optional authentication
pub struct OptionalAuth(pub Option<AuthContext>);

impl FromRequest for OptionalAuth {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let auth = req.extensions().get::<AuthContext>().cloned();
        ready(Ok(OptionalAuth(auth)))
    }
}
