pub mod key;

pub use key::{FileKeyRepository, InMemoryKeyRepository, KeyRepository, PersistedKeySet};
