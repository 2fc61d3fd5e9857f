//! # Storage Module
//!
//! Handles all data persistence for the café manager.
//!
//! Every entity collection (inventory, staff, treasury, ...) is persisted as a
//! single JSON blob under a fixed key. Two interchangeable backends implement
//! the [`KeyValueStore`] trait:
//!
//! - **SQLite**: one `key_values` table accessed through SQLx
//! - **Files**: one `<key>.json` file per collection, written atomically
//!
//! Domain services never talk to a backend directly. They obtain a
//! [`CollectionRepository`] from the shared [`StoreConnection`], which
//! serializes read-modify-write cycles per collection.

pub mod connection;
pub mod files;
pub mod repository;
pub mod sqlite;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use connection::StoreConnection;
pub use repository::{CollectionGuard, CollectionRepository};
pub use traits::{KeyValueStore, Record};
