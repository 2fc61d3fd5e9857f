//! SQLite backend: a single `key_values` table accessed through SQLx.

pub mod db;

pub use db::SqliteStore;
