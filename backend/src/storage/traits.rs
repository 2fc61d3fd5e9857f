//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    Asset, Document, InventoryItem, PairingSession, RentalUnit, Staff, StockMovement,
    Subscription, Task, TreasuryTransaction,
};

/// Trait defining the interface for the underlying key/value persistence
///
/// Every collection is stored as one JSON blob under a fixed key, so a
/// backend only needs to move strings in and out by key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieve a value by its key
    async fn get_value(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, overwriting any existing value for the same key
    async fn put_value(&self, key: &str, value: &str) -> Result<()>;
}

/// A record persisted as part of a named collection
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Storage key of the collection this record lives in
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

macro_rules! impl_record {
    ($ty:ty, $key:literal) => {
        impl Record for $ty {
            const COLLECTION: &'static str = $key;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

impl_record!(InventoryItem, "inventory");
impl_record!(StockMovement, "stock_movements");
impl_record!(Asset, "assets");
impl_record!(Staff, "staff");
impl_record!(Task, "tasks");
impl_record!(Document, "documents");
impl_record!(TreasuryTransaction, "treasury");
impl_record!(RentalUnit, "rentals");
impl_record!(Subscription, "subscriptions");
impl_record!(PairingSession, "pairing_sessions");
