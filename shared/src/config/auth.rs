//! Credential lifecycle configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::duration::parse_duration;

/// Signing and revocation configuration for the token subsystem.
///
/// Durations are kept as strings (`"60m"`, `"7d"`) for operators and parsed
/// once through [`AuthConfig::lifetimes`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Primary signing secret. Required: without it no token can be issued.
    #[serde(default)]
    pub primary_secret: Option<String>,

    /// Optional fallback secret, kept as a long-lived verification key
    #[serde(default)]
    pub fallback_secret: Option<String>,

    /// How long a generated key stays current before it is rotated
    #[serde(default = "default_rotation_interval")]
    pub rotation_interval: String,

    /// Access token lifetime
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl: String,

    /// Refresh token lifetime
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl: String,

    /// How long a retired key keeps verifying after its expiry.
    /// Defaults to the refresh token lifetime.
    #[serde(default)]
    pub key_grace_period: Option<String>,

    /// Location of the persisted key set; `None` keeps keys in memory only
    #[serde(default)]
    pub key_store_path: Option<PathBuf>,

    /// Pinned signing algorithm (HS256, HS384 or HS512)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// JWT issuer claim
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// JWT audience claim
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Whether tokens can be revoked at all
    #[serde(default = "default_true")]
    pub revocation_enabled: bool,

    /// Whether authentication consults the revocation store
    #[serde(default = "default_true")]
    pub revocation_check_enabled: bool,

    /// Window during which a rotated refresh token is still tolerated
    #[serde(default = "default_rotation_grace_seconds")]
    pub rotation_grace_seconds: u64,

    /// How often the key cleanup task runs
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            primary_secret: None,
            fallback_secret: None,
            rotation_interval: default_rotation_interval(),
            access_token_ttl: default_access_token_ttl(),
            refresh_token_ttl: default_refresh_token_ttl(),
            key_grace_period: None,
            key_store_path: None,
            algorithm: default_algorithm(),
            issuer: default_issuer(),
            audience: default_audience(),
            revocation_enabled: true,
            revocation_check_enabled: true,
            rotation_grace_seconds: default_rotation_grace_seconds(),
            cleanup_interval: default_cleanup_interval(),
        }
    }
}

impl AuthConfig {
    /// Create a configuration with the given primary secret
    pub fn new(primary_secret: impl Into<String>) -> Self {
        Self {
            primary_secret: Some(primary_secret.into()),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let flag = |name: &str, default: bool| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };

        Self {
            primary_secret: std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
            fallback_secret: std::env::var("JWT_FALLBACK_SECRET").ok().filter(|s| !s.is_empty()),
            rotation_interval: std::env::var("JWT_ROTATION_INTERVAL")
                .unwrap_or(defaults.rotation_interval),
            access_token_ttl: std::env::var("JWT_ACCESS_TOKEN_TTL")
                .unwrap_or(defaults.access_token_ttl),
            refresh_token_ttl: std::env::var("JWT_REFRESH_TOKEN_TTL")
                .unwrap_or(defaults.refresh_token_ttl),
            key_grace_period: std::env::var("JWT_KEY_GRACE_PERIOD").ok(),
            key_store_path: std::env::var("JWT_KEY_STORE_PATH").ok().map(PathBuf::from),
            algorithm: std::env::var("JWT_ALGORITHM").unwrap_or(defaults.algorithm),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
            revocation_enabled: flag("TOKEN_REVOCATION_ENABLED", true),
            revocation_check_enabled: flag("TOKEN_REVOCATION_CHECK_ENABLED", true),
            rotation_grace_seconds: std::env::var("TOKEN_ROTATION_GRACE_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rotation_grace_seconds),
            cleanup_interval: std::env::var("JWT_KEY_CLEANUP_INTERVAL")
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Set the access token lifetime
    pub fn with_access_ttl(mut self, ttl: impl Into<String>) -> Self {
        self.access_token_ttl = ttl.into();
        self
    }

    /// Set the refresh token lifetime
    pub fn with_refresh_ttl(mut self, ttl: impl Into<String>) -> Self {
        self.refresh_token_ttl = ttl.into();
        self
    }

    /// Set the key rotation interval
    pub fn with_rotation_interval(mut self, interval: impl Into<String>) -> Self {
        self.rotation_interval = interval.into();
        self
    }

    /// Set the retired-key grace period
    pub fn with_key_grace_period(mut self, period: impl Into<String>) -> Self {
        self.key_grace_period = Some(period.into());
        self
    }

    /// Parse every duration string once
    pub fn lifetimes(&self) -> TokenLifetimes {
        let refresh = parse_duration(&self.refresh_token_ttl);
        TokenLifetimes {
            access: parse_duration(&self.access_token_ttl),
            refresh,
            rotation_interval: parse_duration(&self.rotation_interval),
            key_grace_period: self
                .key_grace_period
                .as_deref()
                .map(parse_duration)
                .unwrap_or(refresh),
            rotation_grace: Duration::from_secs(self.rotation_grace_seconds),
            cleanup_interval: parse_duration(&self.cleanup_interval),
        }
    }
}

/// Strongly-typed durations derived from [`AuthConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
    pub rotation_interval: Duration,
    pub key_grace_period: Duration,
    pub rotation_grace: Duration,
    pub cleanup_interval: Duration,
}

fn default_rotation_interval() -> String {
    String::from("30d")
}

fn default_access_token_ttl() -> String {
    String::from("60m")
}

fn default_refresh_token_ttl() -> String {
    String::from("7d")
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn default_issuer() -> String {
    String::from("credkeep")
}

fn default_audience() -> String {
    String::from("credkeep-api")
}

fn default_true() -> bool {
    true
}

fn default_rotation_grace_seconds() -> u64 {
    10
}

fn default_cleanup_interval() -> String {
    String::from("1h")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert!(config.primary_secret.is_none());
        assert_eq!(config.algorithm, "HS256");
        assert!(config.revocation_enabled);
        assert!(config.revocation_check_enabled);
        assert_eq!(config.rotation_grace_seconds, 10);
    }

    #[test]
    fn test_lifetimes_parsed_once() {
        let config = AuthConfig::new("secret")
            .with_access_ttl("15m")
            .with_refresh_ttl("14d")
            .with_rotation_interval("1d");
        let lifetimes = config.lifetimes();

        assert_eq!(lifetimes.access, Duration::from_secs(900));
        assert_eq!(lifetimes.refresh, Duration::from_secs(14 * 86400));
        assert_eq!(lifetimes.rotation_interval, Duration::from_secs(86400));
        // grace period follows the refresh lifetime unless configured
        assert_eq!(lifetimes.key_grace_period, lifetimes.refresh);
        assert_eq!(lifetimes.rotation_grace, Duration::from_secs(10));
    }

    #[test]
    fn test_explicit_key_grace_period() {
        let config = AuthConfig::new("secret").with_key_grace_period("2h");
        assert_eq!(config.lifetimes().key_grace_period, Duration::from_secs(7200));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: AuthConfig =
            serde_json::from_str(r#"{"primary_secret": "s1", "access_token_ttl": "30m"}"#).unwrap();
        assert_eq!(config.primary_secret.as_deref(), Some("s1"));
        assert_eq!(config.access_token_ttl, "30m");
        assert_eq!(config.refresh_token_ttl, "7d");
        assert_eq!(config.issuer, "credkeep");
    }
}
