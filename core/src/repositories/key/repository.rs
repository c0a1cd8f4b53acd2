//! Key repository trait defining the interface for signing key persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::SigningKey;
use crate::errors::DomainError;

/// Durable record of the key store's state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedKeySet {
    /// Identifier of the key that signs new tokens
    pub current_key_id: Option<String>,

    /// Generated keys, current and retired
    pub keys: Vec<SigningKey>,

    /// When the record was last written
    pub last_updated: DateTime<Utc>,
}

/// Repository trait for signing key persistence
///
/// The key store is the only writer. Implementations are called with the key
/// store's writer lock held, so they must not call back into the store.
pub trait KeyRepository: Send + Sync {
    /// Load the persisted key set
    ///
    /// # Returns
    /// * `Ok(Some(PersistedKeySet))` - State found
    /// * `Ok(None)` - Nothing persisted yet
    /// * `Err(DomainError)` - Storage could not be read or decoded
    fn load(&self) -> Result<Option<PersistedKeySet>, DomainError>;

    /// Replace the persisted key set
    fn save(&self, key_set: &PersistedKeySet) -> Result<(), DomainError>;

    /// Human readable location, for logs
    fn describe(&self) -> String;
}
