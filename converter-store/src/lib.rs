//! # Converter Store
//!
//! Concrete persistent key-value store implementations (adapters) for the
//! currency converter. This crate provides adapters that implement the
//! `KeyValueStore` port.

use async_trait::async_trait;
use converter_types::{KeyValueStore, StoreError};
use serde_json::Value;

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// Unified store wrapper selected at runtime from a storage URL.
pub enum Store {
    Memory(MemoryStore),
    File(JsonFileStore),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteStore),
}

/// Build and initialize a store from a storage URL.
///
/// # Examples
///
/// ```ignore
/// let store = build_store("memory:").await?;
/// let store = build_store("file://data/converter.json").await?;
///
/// // SQLite (with `sqlite` feature)
/// let store = build_store("sqlite://data/converter.db?mode=rwc").await?;
/// ```
pub async fn build_store(url: &str) -> anyhow::Result<Store> {
    if url == "memory:" {
        return Ok(Store::Memory(MemoryStore::new()));
    }
    if let Some(path) = url.strip_prefix("file://") {
        return Ok(Store::File(JsonFileStore::open(path).await?));
    }
    if url.starts_with("sqlite:") {
        #[cfg(feature = "sqlite")]
        return Ok(Store::Sqlite(SqliteStore::new(url).await?));
        #[cfg(not(feature = "sqlite"))]
        anyhow::bail!("SQLite storage requires the `sqlite` feature: {}", url);
    }
    anyhow::bail!("Unsupported storage URL: {}", url)
}

// ─────────────────────────────────────────────────────────────────────────────
// Implement KeyValueStore for Store (delegation)
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl KeyValueStore for Store {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        match self {
            Store::Memory(inner) => inner.get(key).await,
            Store::File(inner) => inner.get(key).await,
            #[cfg(feature = "sqlite")]
            Store::Sqlite(inner) => inner.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        match self {
            Store::Memory(inner) => inner.set(key, value).await,
            Store::File(inner) => inner.set(key, value).await,
            #[cfg(feature = "sqlite")]
            Store::Sqlite(inner) => inner.set(key, value).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match self {
            Store::Memory(inner) => inner.remove(key).await,
            Store::File(inner) => inner.remove(key).await,
            #[cfg(feature = "sqlite")]
            Store::Sqlite(inner) => inner.remove(key).await,
        }
    }
}
