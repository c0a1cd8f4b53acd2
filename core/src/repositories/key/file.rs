//! JSON file key repository.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::errors::DomainError;

use super::repository::{KeyRepository, PersistedKeySet};

/// Key repository backed by a single JSON file
///
/// Writes go to a sibling temporary file that is renamed over the target, so
/// a reader never sees a half-written record.
#[derive(Debug, Clone)]
pub struct FileKeyRepository {
    path: PathBuf,
}

impl FileKeyRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_restricted(path: &Path, contents: &[u8]) -> std::io::Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path)?;
        file.write_all(contents)?;
        file.sync_all()
    }
}

impl KeyRepository for FileKeyRepository {
    fn load(&self) -> Result<Option<PersistedKeySet>, DomainError> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::Persistence {
                    message: format!("Failed to read key file {}: {}", self.path.display(), e),
                })
            }
        };

        serde_json::from_slice(&contents)
            .map(Some)
            .map_err(|e| DomainError::Persistence {
                message: format!("Invalid key file {}: {}", self.path.display(), e),
            })
    }

    fn save(&self, key_set: &PersistedKeySet) -> Result<(), DomainError> {
        let contents = serde_json::to_vec_pretty(key_set).map_err(|e| DomainError::Internal {
            message: format!("Failed to encode key set: {}", e),
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| DomainError::Persistence {
                    message: format!("Failed to create {}: {}", parent.display(), e),
                })?;
            }
        }

        let temp = self.temp_path();
        Self::write_restricted(&temp, &contents)
            .and_then(|_| fs::rename(&temp, &self.path))
            .map_err(|e| DomainError::Persistence {
                message: format!("Failed to write key file {}: {}", self.path.display(), e),
            })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
