//! Signing key store with rotation and persistence
//!
//! Readers take an immutable [`KeySet`] snapshot through an `ArcSwap`, so the
//! verify path never locks. Writers (rotation, purge) serialize on a mutex,
//! build a new snapshot and publish it in one store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use arc_swap::ArcSwap;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::domain::entities::{KeySource, KeySummary, SigningKey};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::{InMemoryKeyRepository, KeyRepository, PersistedKeySet};

use super::config::KeyStoreConfig;

/// Id of the key seeded from the configured primary secret
pub const PRIMARY_KEY_ID: &str = "primary";

/// Id of the key seeded from the configured fallback secret
pub const FALLBACK_KEY_ID: &str = "fallback";

/// Immutable view of every known signing key
#[derive(Debug, Clone)]
pub struct KeySet {
    pub current_key_id: Option<String>,
    pub keys: Vec<Arc<SigningKey>>,
    pub last_updated: DateTime<Utc>,
}

impl KeySet {
    fn empty() -> Self {
        Self {
            current_key_id: None,
            keys: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    /// The active key, if any
    pub fn current(&self) -> Option<&Arc<SigningKey>> {
        let id = self.current_key_id.as_deref()?;
        self.keys.iter().find(|k| k.id == id && k.is_active)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<SigningKey>> {
        self.keys.iter().find(|k| k.id == id)
    }

    /// Record written to durable storage; configured keys are left out
    fn to_persisted(&self) -> PersistedKeySet {
        PersistedKeySet {
            current_key_id: self.current_key_id.clone(),
            keys: self
                .keys
                .iter()
                .filter(|k| k.source == KeySource::Generated)
                .map(|k| SigningKey::clone(k))
                .collect(),
            last_updated: self.last_updated,
        }
    }
}

/// Read-only diagnostic view of the key store
#[derive(Debug, Clone, Serialize)]
pub struct KeyStoreStatus {
    pub current_key_id: Option<String>,
    pub current_key: Option<KeySummary>,
    pub verification_key_count: usize,
    pub total_key_count: usize,
    pub rotation_interval_seconds: i64,
}

/// Owner of the signing keys
pub struct KeyStore {
    snapshot: ArcSwap<KeySet>,
    writer: Mutex<()>,
    repository: Arc<dyn KeyRepository>,
    config: KeyStoreConfig,
    provisioned: bool,
    dirty: AtomicBool,
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("repository", &self.repository.describe())
            .field("config", &self.config)
            .field("provisioned", &self.provisioned)
            .finish_non_exhaustive()
    }
}

impl KeyStore {
    /// Loads the persisted key set or initializes a new one
    ///
    /// Never fails: unreadable storage falls back to a fresh in-memory set.
    /// The configured primary (and optional fallback) secret are seeded as
    /// pinned verification keys on every start. Without a primary secret the
    /// store stays unprovisioned and cannot sign.
    ///
    /// # Arguments
    ///
    /// * `config` - Rotation interval and retired-key grace period
    /// * `primary_secret` - Required for issuance
    /// * `fallback_secret` - Optional additional verification secret
    /// * `repository` - Durable storage for generated keys
    pub fn load_or_initialize(
        config: KeyStoreConfig,
        primary_secret: Option<&str>,
        fallback_secret: Option<&str>,
        repository: Arc<dyn KeyRepository>,
    ) -> Self {
        let primary_secret = primary_secret.filter(|s| !s.is_empty());
        let fallback_secret = fallback_secret.filter(|s| !s.is_empty());
        let provisioned = primary_secret.is_some();
        let now = Utc::now();

        let mut set = match repository.load() {
            Ok(Some(persisted)) => {
                info!(
                    location = %repository.describe(),
                    keys = persisted.keys.len(),
                    "Loaded persisted signing keys"
                );
                KeySet {
                    current_key_id: persisted.current_key_id,
                    keys: persisted
                        .keys
                        .into_iter()
                        .filter(|k| k.source == KeySource::Generated)
                        .map(Arc::new)
                        .collect(),
                    last_updated: persisted.last_updated,
                }
            }
            Ok(None) => {
                info!(location = %repository.describe(), "No persisted signing keys, initializing");
                KeySet::empty()
            }
            Err(e) => {
                warn!(
                    location = %repository.describe(),
                    error = %e,
                    "Failed to load signing keys, initializing in memory"
                );
                KeySet::empty()
            }
        };

        Self::normalize_active(&mut set);

        if let Some(secret) = primary_secret {
            set.keys.push(Arc::new(SigningKey::configured(
                PRIMARY_KEY_ID,
                secret,
                config.rotation_interval,
            )));
        }
        if let Some(secret) = fallback_secret {
            set.keys.push(Arc::new(SigningKey::configured(
                FALLBACK_KEY_ID,
                secret,
                config.rotation_interval,
            )));
        }

        let store = Self {
            snapshot: ArcSwap::from_pointee(set.clone()),
            writer: Mutex::new(()),
            repository,
            config,
            provisioned,
            dirty: AtomicBool::new(false),
        };

        if !provisioned {
            error!("No primary signing secret configured; token issuance is disabled");
            return store;
        }

        let needs_key = set.current().map_or(true, |k| k.is_expired_at(now));
        if needs_key {
            let key = store.next_key_set(&set, now);
            store.publish(key);
        } else {
            let purged = store.without_purgeable(&set, now);
            store.publish(purged);
        }

        store
    }

    /// Key store that keeps generated keys in memory only
    pub fn in_memory(config: KeyStoreConfig, primary_secret: &str) -> Self {
        Self::load_or_initialize(
            config,
            Some(primary_secret),
            None,
            Arc::new(InMemoryKeyRepository::new()),
        )
    }

    /// Produces a new random key with a full issuance window
    pub fn generate_key(&self) -> SigningKey {
        SigningKey::generate(self.config.rotation_interval)
    }

    /// Whether a primary secret was configured
    pub fn is_provisioned(&self) -> bool {
        self.provisioned
    }

    pub fn config(&self) -> &KeyStoreConfig {
        &self.config
    }

    /// Current immutable snapshot
    pub fn snapshot(&self) -> Arc<KeySet> {
        self.snapshot.load_full()
    }

    /// Returns the active key, rotating first if its issuance window closed
    pub fn current_key(&self) -> DomainResult<Arc<SigningKey>> {
        let now = Utc::now();
        if let Some(key) = self.snapshot.load().current() {
            if !key.is_expired_at(now) {
                return Ok(Arc::clone(key));
            }
        }

        if !self.provisioned {
            return Err(TokenError::NoActiveKey.into());
        }

        let _guard = self.lock_writer()?;
        // Another writer may have rotated while we waited
        let set = self.snapshot.load_full();
        if let Some(key) = set.current() {
            if !key.is_expired_at(now) {
                return Ok(Arc::clone(key));
            }
        }

        // Request path: publish in memory only, the cleanup task writes it out
        debug!("Current signing key expired, rotating");
        self.rotate_locked(&set, now, false)
    }

    /// Replaces the active key with a freshly generated one
    ///
    /// The previous key is demoted and stays verifiable through the grace
    /// period. Persistence failures are logged and retried by [`flush`].
    ///
    /// [`flush`]: KeyStore::flush
    pub fn rotate(&self) -> DomainResult<Arc<SigningKey>> {
        if !self.provisioned {
            return Err(TokenError::NoActiveKey.into());
        }

        let _guard = self.lock_writer()?;
        let set = self.snapshot.load_full();
        self.rotate_locked(&set, Utc::now(), true)
    }

    /// Keys to try when verifying: current first, then the other verifiable keys
    pub fn verification_keys(&self) -> Vec<Arc<SigningKey>> {
        self.verification_keys_at(Utc::now())
    }

    pub fn verification_keys_at(&self, now: DateTime<Utc>) -> Vec<Arc<SigningKey>> {
        let set = self.snapshot.load();
        let grace = self.config.grace_period;

        let current = set.current().cloned();
        let mut others: Vec<Arc<SigningKey>> = set
            .keys
            .iter()
            .filter(|k| !k.is_active && k.is_verifiable_at(now, grace))
            .cloned()
            .collect();
        // Newest retired keys are the most likely signers
        others.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        current.into_iter().chain(others).collect()
    }

    /// Looks up a key by id, regardless of its state
    pub fn key(&self, id: &str) -> Option<Arc<SigningKey>> {
        self.snapshot.load().get(id).cloned()
    }

    /// Removes retired keys whose grace period has elapsed
    pub fn purge_expired(&self) -> DomainResult<usize> {
        self.purge_expired_at(Utc::now())
    }

    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let _guard = self.lock_writer()?;
        let set = self.snapshot.load_full();

        let next = self.without_purgeable(&set, now);
        let removed = set.keys.len() - next.keys.len();
        if removed > 0 {
            info!(removed, "Purged retired signing keys");
            self.publish(next);
        }
        Ok(removed)
    }

    /// Writes a key set that has not reached storage yet, either because an
    /// earlier write failed or because it was rotated on the request path
    ///
    /// Returns `true` when a pending write was flushed.
    pub fn flush(&self) -> DomainResult<bool> {
        if !self.dirty.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let _guard = self.lock_writer()?;
        let set = self.snapshot.load_full();
        self.repository.save(&set.to_persisted())?;
        self.dirty.store(false, Ordering::SeqCst);
        info!(location = %self.repository.describe(), "Signing keys persisted after earlier failure");
        Ok(true)
    }

    /// Whether the latest key set has not reached durable storage yet
    pub fn has_pending_writes(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Diagnostic view, no side effects
    pub fn status(&self) -> KeyStoreStatus {
        let set = self.snapshot.load();
        let current = set.current();
        KeyStoreStatus {
            current_key_id: current.map(|k| k.id.clone()),
            current_key: current.map(|k| k.summary()),
            verification_key_count: self.verification_keys().len(),
            total_key_count: set.keys.len(),
            rotation_interval_seconds: self.config.rotation_interval.num_seconds(),
        }
    }

    fn lock_writer(&self) -> DomainResult<MutexGuard<'_, ()>> {
        self.writer.lock().map_err(|e| DomainError::Internal {
            message: format!("Key store writer lock poisoned: {}", e),
        })
    }

    fn rotate_locked(
        &self,
        set: &KeySet,
        now: DateTime<Utc>,
        write_through: bool,
    ) -> DomainResult<Arc<SigningKey>> {
        let previous = set.current_key_id.clone();
        let next = self.next_key_set(set, now);
        let current = next
            .current()
            .cloned()
            .ok_or(DomainError::Token(TokenError::NoActiveKey))?;

        info!(
            key_id = %current.id,
            previous_key_id = previous.as_deref().unwrap_or("none"),
            "Rotated signing key"
        );
        if write_through {
            self.publish(next);
        } else {
            self.publish_deferred(next);
        }
        Ok(current)
    }

    /// New set with a fresh active key, the previous one demoted, and
    /// fully retired keys dropped
    fn next_key_set(&self, set: &KeySet, now: DateTime<Utc>) -> KeySet {
        let new_key = Arc::new(self.generate_key());

        let mut keys: Vec<Arc<SigningKey>> = set
            .keys
            .iter()
            .map(|k| {
                if k.is_active {
                    let mut demoted = SigningKey::clone(k);
                    demoted.is_active = false;
                    // Demotion closes the issuance window
                    demoted.expires_at = demoted.expires_at.min(now);
                    Arc::new(demoted)
                } else {
                    Arc::clone(k)
                }
            })
            .filter(|k| !k.is_purgeable_at(now, self.config.grace_period))
            .collect();
        keys.insert(0, Arc::clone(&new_key));

        KeySet {
            current_key_id: Some(new_key.id.clone()),
            keys,
            last_updated: now,
        }
    }

    fn without_purgeable(&self, set: &KeySet, now: DateTime<Utc>) -> KeySet {
        KeySet {
            current_key_id: set.current_key_id.clone(),
            keys: set
                .keys
                .iter()
                .filter(|k| !k.is_purgeable_at(now, self.config.grace_period))
                .cloned()
                .collect(),
            last_updated: now,
        }
    }

    /// Publishes a snapshot and writes it through to storage
    fn publish(&self, set: KeySet) {
        let persisted = set.to_persisted();
        self.snapshot.store(Arc::new(set));

        match self.repository.save(&persisted) {
            Ok(()) => self.dirty.store(false, Ordering::SeqCst),
            Err(e) => {
                self.dirty.store(true, Ordering::SeqCst);
                warn!(
                    location = %self.repository.describe(),
                    error = %e,
                    "Failed to persist signing keys; continuing with in-memory state"
                );
            }
        }
    }

    /// Publishes a snapshot and leaves the write to [`flush`]
    ///
    /// [`flush`]: KeyStore::flush
    fn publish_deferred(&self, set: KeySet) {
        self.snapshot.store(Arc::new(set));
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// At most one key may be active: the one named current
    fn normalize_active(set: &mut KeySet) {
        let current_id = set.current_key_id.clone();
        let mut seen_current = false;
        set.keys = set
            .keys
            .iter()
            .map(|k| {
                let should_be_active =
                    !seen_current && current_id.as_deref() == Some(k.id.as_str()) && k.is_active;
                if should_be_active {
                    seen_current = true;
                }
                if k.is_active == should_be_active {
                    Arc::clone(k)
                } else {
                    let mut fixed = SigningKey::clone(k);
                    fixed.is_active = should_be_active;
                    Arc::new(fixed)
                }
            })
            .collect();
        if !seen_current {
            set.current_key_id = None;
        }
    }

    /// Grace period applied to retired keys
    pub fn grace_period(&self) -> Duration {
        self.config.grace_period
    }
}
