use std::path::PathBuf;

use uuid::Uuid;

use crate::error::{Result, SyncError};

// ---------------------------------------------------------------------------
// DeviceIdStore
// ---------------------------------------------------------------------------

/// Device identifier generated once and cached for the lifetime of the
/// installation. Used to tag guest and anonymous activity before any
/// account exists.
pub struct DeviceIdStore {
    dir: PathBuf,
}

impl DeviceIdStore {
    /// Store rooted at `~/.ciclo`.
    pub fn new() -> Result<Self> {
        let home = home::home_dir().ok_or(SyncError::HomeNotFound)?;
        Ok(Self::at(home.join(".ciclo")))
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Return the cached id, generating and persisting one on first use.
    pub fn load_or_create(&self) -> Result<String> {
        let path = self.dir.join("device_id");
        if let Ok(existing) = std::fs::read_to_string(&path) {
            let trimmed = existing.trim();
            if !trimmed.is_empty() {
                return Ok(trimmed.to_owned());
            }
        }
        let id = Uuid::new_v4().to_string();
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, &id)?;
        Ok(id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn id_is_stable_across_calls() {
        let dir = TempDir::new().unwrap();
        let store = DeviceIdStore::at(dir.path().join("ciclo"));
        let first = store.load_or_create().unwrap();
        let second = store.load_or_create().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 36);
    }

    #[test]
    fn separate_installs_get_distinct_ids() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let id_a = DeviceIdStore::at(a.path()).load_or_create().unwrap();
        let id_b = DeviceIdStore::at(b.path()).load_or_create().unwrap();
        assert_ne!(id_a, id_b);
    }

    #[test]
    fn blank_file_is_regenerated() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("device_id"), "  \n").unwrap();
        let id = DeviceIdStore::at(dir.path()).load_or_create().unwrap();
        assert!(!id.trim().is_empty());
    }
}
