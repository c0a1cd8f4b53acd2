//! Layered application configuration
//!
//! Sources, lowest precedence first:
//! 1. flat environment variables read by the `from_env` constructors
//!    (`JWT_SECRET`, `REDIS_URL`, ...), with `.env` loaded by `dotenvy`
//! 2. an optional TOML file, `credkeep.toml` or the path in `CREDKEEP_CONFIG`
//! 3. nested environment variables such as `CREDKEEP__AUTH__PRIMARY_SECRET`

use config::{Config, ConfigError, Environment as EnvSource, File};
use tracing::{error, warn};

use ck_shared::config::AppSettings;

const DEFAULT_CONFIG_FILE: &str = "credkeep";

/// Fully resolved process configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub settings: AppSettings,
}

impl AppConfig {
    /// Load configuration from `.env`, the config file and the environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = std::env::var("CREDKEEP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let flat = AppSettings::from_env();

        let settings: AppSettings = Config::builder()
            .add_source(Config::try_from(&flat)?)
            .add_source(File::with_name(&path).required(false))
            .add_source(EnvSource::with_prefix("CREDKEEP").separator("__").try_parsing(true))
            .build()?
            .try_deserialize()?;

        let config = Self::from_settings(settings);
        config.validate()?;
        Ok(config)
    }

    /// Settings are taken as given; a missing secret is never filled in
    pub fn from_settings(settings: AppSettings) -> Self {
        Self { settings }
    }

    pub fn has_primary_secret(&self) -> bool {
        self.settings
            .auth
            .primary_secret
            .as_deref()
            .map_or(false, |s| !s.is_empty())
    }

    /// Production refuses to start without a primary signing secret
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_production() && !self.has_primary_secret() {
            return Err(ConfigError::Message(
                "JWT_SECRET (auth.primary_secret) is required in production".to_string(),
            ));
        }
        Ok(())
    }

    /// Emit warnings about insecure or incomplete settings
    ///
    /// Called once logging is installed.
    pub fn log_warnings(&self) {
        let environment = self.settings.environment;

        if !self.has_primary_secret() {
            error!(%environment, "No primary signing secret configured, token issuance will fail");
        }

        if self.settings.auth.key_store_path.is_none() {
            warn!("No key store path configured, generated keys will not survive a restart");
        }
    }

    pub fn is_production(&self) -> bool {
        self.settings.environment.is_production()
    }
}
