//! Generic repository over a whole-collection JSON blob.

use anyhow::{Context, Result};
use log::debug;
use std::marker::PhantomData;
use tokio::sync::OwnedMutexGuard;

use super::connection::StoreConnection;
use super::traits::{KeyValueStore, Record};

/// Repository for one collection of records
pub struct CollectionRepository<T: Record> {
    connection: StoreConnection,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> Clone for CollectionRepository<T> {
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Record> CollectionRepository<T> {
    pub fn new(connection: StoreConnection) -> Self {
        Self {
            connection,
            _marker: PhantomData,
        }
    }

    /// Read the whole collection; a missing key is an empty collection
    ///
    /// Writes replace the blob in one step, so an unlocked read always sees
    /// a complete collection.
    pub async fn load_all(&self) -> Result<Vec<T>> {
        read_collection(self.connection.store()).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>> {
        Ok(self.load_all().await?.into_iter().find(|r| r.id() == id))
    }

    /// Take the collection lock for a multi-step update
    pub async fn lock(&self) -> CollectionGuard<T> {
        let guard = self
            .connection
            .collection_lock(T::COLLECTION)
            .lock_owned()
            .await;
        CollectionGuard {
            connection: self.connection.clone(),
            _guard: guard,
            _marker: PhantomData,
        }
    }

    /// Load, modify and save the collection under its lock
    ///
    /// Nothing is written when the closure returns an error.
    pub async fn mutate<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, E>,
        E: From<anyhow::Error>,
    {
        let guard = self.lock().await;
        let mut records = guard.load().await?;
        let result = f(&mut records)?;
        guard.save(&records).await?;
        Ok(result)
    }

    pub async fn insert(&self, record: T) -> Result<T> {
        self.mutate(|records| {
            records.push(record.clone());
            Ok::<_, anyhow::Error>(record)
        })
        .await
    }

    /// Delete a record by id
    /// Returns true if the record was found and deleted
    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.mutate(|records| {
            let before = records.len();
            records.retain(|r| r.id() != id);
            Ok::<_, anyhow::Error>(records.len() != before)
        })
        .await
    }

    /// Replace the whole collection
    pub async fn replace_all(&self, records: Vec<T>) -> Result<()> {
        let guard = self.lock().await;
        guard.save(&records).await
    }
}

/// Holds a collection lock; load and save while it is alive
pub struct CollectionGuard<T: Record> {
    connection: StoreConnection,
    _guard: OwnedMutexGuard<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> CollectionGuard<T> {
    pub async fn load(&self) -> Result<Vec<T>> {
        read_collection(self.connection.store()).await
    }

    pub async fn save(&self, records: &[T]) -> Result<()> {
        let json = serde_json::to_string(records)
            .with_context(|| format!("Failed to serialize collection '{}'", T::COLLECTION))?;
        self.connection
            .store()
            .put_value(T::COLLECTION, &json)
            .await
            .with_context(|| format!("Failed to persist collection '{}'", T::COLLECTION))?;
        debug!("Saved {} records to '{}'", records.len(), T::COLLECTION);
        Ok(())
    }
}

async fn read_collection<T: Record>(store: &dyn KeyValueStore) -> Result<Vec<T>> {
    match store.get_value(T::COLLECTION).await? {
        Some(json) => serde_json::from_str(&json)
            .with_context(|| format!("Collection '{}' is not valid JSON", T::COLLECTION)),
        None => Ok(Vec::new()),
    }
}
