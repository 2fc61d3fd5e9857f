use anyhow::Result;
use log::info;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;

use super::files::FileStore;
use super::repository::CollectionRepository;
use super::sqlite::SqliteStore;
use super::traits::{KeyValueStore, Record};
use crate::config::{AppConfig, StorageBackend};

/// StoreConnection is the single source of truth shared by every service
///
/// It owns the key/value backend plus one async lock per collection. Every
/// read-modify-write of a collection goes through that lock, so concurrent
/// requests touching the same collection are serialized.
#[derive(Clone)]
pub struct StoreConnection {
    store: Arc<dyn KeyValueStore>,
    locks: Arc<Mutex<HashMap<&'static str, Arc<AsyncMutex<()>>>>>,
}

impl StoreConnection {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Open the backend selected in the configuration
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let data_directory = config.data_directory();
        let store: Arc<dyn KeyValueStore> = match config.storage {
            StorageBackend::Sqlite => {
                std::fs::create_dir_all(&data_directory)?;
                Arc::new(SqliteStore::init(&data_directory).await?)
            }
            StorageBackend::Files => Arc::new(FileStore::new(&data_directory)?),
        };
        info!(
            "Storage ready: {:?} backend in {}",
            config.storage,
            data_directory.display()
        );
        Ok(Self::new(store))
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Get (creating on first use) the lock guarding a collection
    pub(crate) fn collection_lock(&self, collection: &'static str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(collection)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Create a repository for a record type
    pub fn repository<T: Record>(&self) -> CollectionRepository<T> {
        CollectionRepository::new(self.clone())
    }
}

impl fmt::Debug for StoreConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConnection").finish_non_exhaustive()
    }
}
