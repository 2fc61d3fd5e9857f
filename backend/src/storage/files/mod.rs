//! Flat-file backend: one `<key>.json` file per collection in the data directory.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::storage::traits::KeyValueStore;

const EXTENSION: &str = "json";

/// FileStore manages one JSON file per key inside a base directory
#[derive(Clone)]
pub struct FileStore {
    base_directory: PathBuf,
}

impl FileStore {
    /// Create a new file store, creating the base directory if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            std::fs::create_dir_all(&base_path).with_context(|| {
                format!("Failed to create data directory {}", base_path.display())
            })?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Get the file path backing a key
    ///
    /// Keys are restricted to `[a-z0-9_]` so a key can never escape the base directory.
    fn file_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(anyhow!("Invalid storage key: {:?}", key));
        }
        Ok(self.base_directory.join(format!("{}.{}", key, EXTENSION)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let path = self.file_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    async fn put_value(&self, key: &str, value: &str) -> Result<()> {
        let path = self.file_path(key)?;

        // Atomic write using temp file
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, value)
            .await
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .await
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::TestEnvironment;

    #[tokio::test]
    async fn test_put_get_roundtrip_writes_json_file() {
        let env = TestEnvironment::new().unwrap();
        let store = FileStore::new(env.base_directory()).unwrap();

        store.put_value("inventory", r#"[{"id":"1"}]"#).await.unwrap();

        assert!(env.base_directory().join("inventory.json").exists());
        assert!(!env.base_directory().join("inventory.tmp").exists());
        let value = store.get_value("inventory").await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"[{"id":"1"}]"#));
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let env = TestEnvironment::new().unwrap();
        let store = FileStore::new(env.base_directory()).unwrap();

        assert!(store.get_value("staff").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let env = TestEnvironment::new().unwrap();
        let store = FileStore::new(env.base_directory()).unwrap();

        assert!(store.put_value("../escape", "[]").await.is_err());
        assert!(store.get_value("a/b").await.is_err());
    }
}
