//! Directory-backed key-value store: one `<key>.json` file per key.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::domain::error::JournalError;
use crate::ports::store_port::KeyValueStore;

pub struct FileStoreAdapter {
    base_path: PathBuf,
}

impl FileStoreAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn value_path(&self, key: &str) -> Result<PathBuf, JournalError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(JournalError::Storage {
                reason: format!("invalid storage key '{key}'"),
            });
        }
        Ok(self.base_path.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStoreAdapter {
    fn get(&self, key: &str) -> Result<Option<String>, JournalError> {
        let path = self.value_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(JournalError::Storage {
                reason: format!("failed to read {}: {}", path.display(), e),
            }),
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), JournalError> {
        let path = self.value_path(key)?;
        fs::create_dir_all(&self.base_path).map_err(|e| JournalError::Storage {
            reason: format!(
                "failed to create directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        // write-then-rename so a crash never leaves a half-written value
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| JournalError::Storage {
            reason: format!("failed to write {}: {}", tmp.display(), e),
        })?;
        fs::rename(&tmp, &path).map_err(|e| JournalError::Storage {
            reason: format!("failed to replace {}: {}", path.display(), e),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn get_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStoreAdapter::new(dir.path().to_path_buf());
        assert_eq!(store.get("trades").unwrap(), None);
    }

    #[test]
    fn put_creates_directory_and_file() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("nested").join("journal");
        let mut store = FileStoreAdapter::new(base.clone());

        store.put("trades", "[]").unwrap();
        assert_eq!(fs::read_to_string(base.join("trades.json")).unwrap(), "[]");
        assert!(!base.join("trades.json.tmp").exists());
        assert_eq!(store.get("trades").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn put_overwrites() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStoreAdapter::new(dir.path().to_path_buf());
        store.put("k", "one").unwrap();
        store.put("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn unreadable_value_is_storage_error() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("k.json")).unwrap();
        let store = FileStoreAdapter::new(dir.path().to_path_buf());
        assert!(matches!(store.get("k"), Err(JournalError::Storage { .. })));
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStoreAdapter::new(dir.path().to_path_buf());
        assert!(store.put("../escape", "v").is_err());
        assert!(store.get("").is_err());
        assert!(store.get(".hidden").is_err());
    }
}
