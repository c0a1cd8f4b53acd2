//! Signing key entity for HMAC token signatures.

use base64::{
    engine::general_purpose::{STANDARD as BASE64, URL_SAFE_NO_PAD},
    Engine,
};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

/// Length in bytes of generated key material (256 bits)
pub const SECRET_LENGTH: usize = 32;

/// Length in bytes of the random part of a generated key id
const KEY_ID_LENGTH: usize = 12;

/// Where a key's secret came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySource {
    /// Generated by the key store on first run or rotation
    Generated,
    /// Supplied by configuration (primary or fallback secret)
    Configured,
}

/// A symmetric signing key together with its issuance window
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningKey {
    /// Opaque key identifier, carried in the token header as `kid`
    pub id: String,

    /// Raw key material
    #[serde(with = "secret_base64")]
    pub secret: Vec<u8>,

    /// When the key was created
    pub created_at: DateTime<Utc>,

    /// End of the key's issuance window
    pub expires_at: DateTime<Utc>,

    /// Whether this key signs new tokens
    pub is_active: bool,

    /// Origin of the key material
    #[serde(default = "default_source")]
    pub source: KeySource,
}

fn default_source() -> KeySource {
    KeySource::Generated
}

impl SigningKey {
    /// Generates a fresh active key with random id and secret
    pub fn generate(rotation_interval: Duration) -> Self {
        let mut secret = vec![0u8; SECRET_LENGTH];
        OsRng.fill_bytes(&mut secret);

        let now = Utc::now();
        Self {
            id: Self::generate_id(),
            secret,
            created_at: now,
            expires_at: now + rotation_interval,
            is_active: true,
            source: KeySource::Generated,
        }
    }

    /// Builds an inactive, configuration-sourced key
    ///
    /// Configured keys are never rotated out; they stay in the verification
    /// set for as long as they remain configured.
    pub fn configured(id: impl Into<String>, secret: &str, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            secret: secret.as_bytes().to_vec(),
            created_at: now,
            expires_at: now + lifetime,
            is_active: false,
            source: KeySource::Configured,
        }
    }

    fn generate_id() -> String {
        let mut bytes = [0u8; KEY_ID_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Whether the key is exempt from expiry-driven cleanup
    pub fn is_pinned(&self) -> bool {
        self.source == KeySource::Configured
    }

    /// Whether the issuance window has closed
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether tokens signed by this key may still be verified at `now`
    pub fn is_verifiable_at(&self, now: DateTime<Utc>, grace_period: Duration) -> bool {
        self.is_pinned() || self.is_active || now < self.expires_at + grace_period
    }

    /// Whether cleanup may physically remove this key at `now`
    pub fn is_purgeable_at(&self, now: DateTime<Utc>, grace_period: Duration) -> bool {
        !self.is_pinned() && !self.is_active && self.expires_at + grace_period < now
    }

    /// Secret-free view of the key
    pub fn summary(&self) -> KeySummary {
        KeySummary {
            id: self.id.clone(),
            created_at: self.created_at,
            expires_at: self.expires_at,
            is_active: self.is_active,
            source: self.source,
        }
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("is_active", &self.is_active)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Diagnostic view of a signing key without its secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySummary {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub source: KeySource,
}

mod secret_base64 {
    use super::BASE64;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(secret: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(secret))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
