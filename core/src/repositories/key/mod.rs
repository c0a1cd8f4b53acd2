mod file;
mod memory;
mod repository;

pub use file::FileKeyRepository;
pub use memory::InMemoryKeyRepository;
pub use repository::{KeyRepository, PersistedKeySet};
