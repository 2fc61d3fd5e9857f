//! Test utilities module for automatic cleanup and consistent test infrastructure
//!
//! This module provides RAII-based cleanup that guarantees test data is removed
//! even if tests panic or fail.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use super::connection::StoreConnection;
use super::files::FileStore;
use super::sqlite::SqliteStore;

/// RAII Test Environment that automatically cleans up on drop
pub struct TestEnvironment {
    /// The temporary directory - kept alive to prevent auto-cleanup until drop
    _temp_dir: TempDir,
    /// Base directory path for manual inspection if needed
    pub base_path: PathBuf,
}

impl TestEnvironment {
    /// Create a new test environment with automatic cleanup
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            base_path,
        })
    }

    /// Get the base directory path for this test environment
    pub fn base_directory(&self) -> &Path {
        &self.base_path
    }

    /// Connection backed by JSON files in this environment's directory
    pub fn file_connection(&self) -> Result<StoreConnection> {
        let store = FileStore::new(&self.base_path)?;
        Ok(StoreConnection::new(Arc::new(store)))
    }
}

/// Connection backed by a fresh in-memory SQLite database
pub async fn memory_connection() -> StoreConnection {
    let store = SqliteStore::init_test()
        .await
        .expect("Failed to create test database");
    StoreConnection::new(Arc::new(store))
}
