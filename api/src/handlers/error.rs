//! Mapping of domain failures onto HTTP responses
//!
//! Client-facing bodies carry only the error category and a fixed message;
//! internal reasons stay in the logs.

use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use tracing::{debug, error};

use ck_core::errors::{DomainError, TokenError};
use ck_shared::{error_codes, ErrorResponse};

/// Error returned by handlers and the authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{0}")]
    BadRequest(String),

    /// Authenticated, but not allowed to use the route
    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::Domain(err.into())
    }
}

impl ApiError {
    fn token_error(&self) -> Option<&TokenError> {
        match self {
            ApiError::Domain(e) => e.as_token_error(),
            ApiError::BadRequest(_) | ApiError::Forbidden(_) => None,
        }
    }

    /// Client-facing category
    pub fn category(&self) -> &'static str {
        match self {
            ApiError::Domain(DomainError::Token(e)) => e.category(),
            ApiError::Domain(DomainError::Validation { .. }) | ApiError::BadRequest(_) => {
                error_codes::BAD_REQUEST
            }
            ApiError::Forbidden(_) => error_codes::FORBIDDEN,
            ApiError::Domain(_) => error_codes::SERVER_ERROR,
        }
    }

    /// Fixed client-facing message
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Domain(DomainError::Token(e)) => token_message(e).to_string(),
            ApiError::Domain(DomainError::Validation { message }) => message.clone(),
            ApiError::BadRequest(message) => message.clone(),
            ApiError::Forbidden(_) => "Insufficient privileges".to_string(),
            ApiError::Domain(_) => "An internal error occurred".to_string(),
        }
    }
}

fn token_message(err: &TokenError) -> &'static str {
    match err {
        TokenError::MissingToken => "Authentication required",
        TokenError::Malformed | TokenError::InvalidSignature | TokenError::NotYetValid => {
            "The token is invalid"
        }
        TokenError::Expired => "The token has expired",
        TokenError::WrongType { .. } => "The token cannot be used for this request",
        TokenError::Revoked => "The token has been revoked",
        TokenError::NoActiveKey => "Authentication is temporarily unavailable",
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Domain(DomainError::Token(e)) => match e {
                TokenError::MissingToken
                | TokenError::Malformed
                | TokenError::InvalidSignature
                | TokenError::Expired
                | TokenError::NotYetValid => StatusCode::UNAUTHORIZED,
                TokenError::WrongType { .. } | TokenError::Revoked => StatusCode::FORBIDDEN,
                TokenError::NoActiveKey => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Domain(DomainError::Validation { .. }) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Domain(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            debug!(error = %self, "Request rejected");
        }

        let body = ErrorResponse::new(self.category(), self.client_message());
        let mut response = HttpResponse::build(status);

        if status == StatusCode::UNAUTHORIZED {
            let challenge = match self.token_error() {
                Some(TokenError::MissingToken) | None => "Bearer".to_string(),
                Some(_) => format!("Bearer error=\"{}\"", self.category()),
            };
            response.insert_header((header::WWW_AUTHENTICATE, challenge));
        }

        response.json(body)
    }
}
