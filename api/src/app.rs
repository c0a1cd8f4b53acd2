//! Application state and factory
//!
//! This module wires the credential service from configuration and provides
//! the factory for creating the Actix-web application.

use std::sync::Arc;

use actix_web::{web, App, HttpResponse};
use tracing::info;
use tracing_actix_web::TracingLogger;

use ck_core::{
    CredentialService, FileKeyRepository, InMemoryKeyRepository, KeyCleanupConfig,
    KeyCleanupService, KeyRepository, KeyStore, KeyStoreConfig, TokenServiceConfig,
};
use ck_infra::build_revocation_store;
use ck_shared::{error_codes, AppSettings, ErrorResponse};

use crate::middleware::CredentialAuth;
use crate::routes::{auth, health::health_check};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialService>,
}

impl AppState {
    pub fn new(credentials: Arc<CredentialService>) -> Self {
        Self { credentials }
    }

    /// Builds the key store, revocation store and credential service
    pub async fn from_settings(settings: &AppSettings) -> anyhow::Result<Self> {
        let auth = &settings.auth;
        let lifetimes = auth.lifetimes();

        let repository: Arc<dyn KeyRepository> = match &auth.key_store_path {
            Some(path) => Arc::new(FileKeyRepository::new(path)),
            None => Arc::new(InMemoryKeyRepository::new()),
        };
        info!(repository = %repository.describe(), "Loading signing keys");

        let keys = Arc::new(KeyStore::load_or_initialize(
            KeyStoreConfig::from(&lifetimes),
            auth.primary_secret.as_deref(),
            auth.fallback_secret.as_deref(),
            repository,
        ));

        let token_config = TokenServiceConfig::from_auth_config(auth)?;
        let revocations = Arc::new(build_revocation_store(auth, &settings.cache).await);

        Ok(Self::new(Arc::new(CredentialService::from_parts(
            keys,
            token_config,
            revocations,
        ))))
    }

    /// Periodic cleanup over this state's key store and revocation store
    pub fn cleanup_service(&self, settings: &AppSettings) -> KeyCleanupService {
        let config = KeyCleanupConfig {
            interval: settings.auth.lifetimes().cleanup_interval,
            ..KeyCleanupConfig::default()
        };

        KeyCleanupService::new(self.credentials.issuer().key_store().clone(), config)
            .with_revocations(self.credentials.revocations().clone())
    }
}

/// Create and configure the application
pub fn create_app(
    state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let authenticated = CredentialAuth::new(state.credentials.clone());

    App::new()
        .app_data(state)
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            crate::handlers::ApiError::BadRequest(err.to_string()).into()
        }))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1/auth")
                .route("/refresh", web::post().to(auth::refresh))
                .service(
                    web::resource("/logout")
                        .wrap(authenticated.clone())
                        .route(web::post().to(auth::logout)),
                )
                .service(
                    web::resource("/me")
                        .wrap(authenticated.clone())
                        .route(web::get().to(auth::me)),
                )
                .service(
                    web::resource("/status")
                        .wrap(authenticated)
                        .route(web::get().to(auth::status)),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
