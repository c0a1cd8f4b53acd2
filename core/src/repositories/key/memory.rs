//! In-memory key repository for tests and single-process deployments
//! without a key file.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::errors::DomainError;

use super::repository::{KeyRepository, PersistedKeySet};

/// Key repository that keeps the record in process memory
#[derive(Default)]
pub struct InMemoryKeyRepository {
    state: Mutex<Option<PersistedKeySet>>,
    fail_saves: AtomicBool,
    save_count: AtomicUsize,
}

impl InMemoryKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with an existing record
    pub fn with_state(key_set: PersistedKeySet) -> Self {
        Self {
            state: Mutex::new(Some(key_set)),
            ..Self::default()
        }
    }

    /// Makes every subsequent save fail, simulating a storage outage
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// Copy of the last saved record
    pub fn snapshot(&self) -> Option<PersistedKeySet> {
        self.state.lock().ok().and_then(|state| state.clone())
    }
}

impl KeyRepository for InMemoryKeyRepository {
    fn load(&self) -> Result<Option<PersistedKeySet>, DomainError> {
        let state = self.state.lock().map_err(|e| DomainError::Internal {
            message: format!("Failed to read key state: {}", e),
        })?;
        Ok(state.clone())
    }

    fn save(&self, key_set: &PersistedKeySet) -> Result<(), DomainError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DomainError::Persistence {
                message: "in-memory key repository is failing saves".to_string(),
            });
        }

        let mut state = self.state.lock().map_err(|e| DomainError::Internal {
            message: format!("Failed to write key state: {}", e),
        })?;
        *state = Some(key_set.clone());
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
