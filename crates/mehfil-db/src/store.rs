//! # Record Store
//!
//! The storage seam: a key-value store holding one JSON array per
//! collection, loaded and saved whole.
//!
//! ## Implementations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       RecordStore                                       │
//! │        load_collection(c) -> Option<String>                             │
//! │        save_collection(c, payload)                                      │
//! │                 │                                │                      │
//! │                 ▼                                ▼                      │
//! │   ┌───────────────────────────┐    ┌───────────────────────────┐       │
//! │   │  Database (pool.rs)       │    │  MemoryStore (this file)  │       │
//! │   │  record_collections table │    │  RwLock<HashMap>          │       │
//! │   │  one row per collection   │    │  tests, dry runs          │       │
//! │   └───────────────────────────┘    └───────────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stores know nothing about record shapes. Repositories decode the
//! payload with [`load_records`] and write it back with [`save_records`].

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::DbResult;

// =============================================================================
// Collections
// =============================================================================

/// The collections the storefront keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Orders,
    Subscriptions,
    Users,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Orders, Collection::Subscriptions, Collection::Users];

    /// Storage key. Matches the keys the browser storefront used, so an
    /// exported browser collection can be imported as-is; the repositories
    /// read the browser record shapes alongside their own.
    pub const fn key(&self) -> &'static str {
        match self {
            Collection::Orders => "cafe_mehfil_orders",
            Collection::Subscriptions => "cafe_mehfil_subscriptions",
            Collection::Users => "cafe_mehfil_users",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// =============================================================================
// RecordStore Trait
// =============================================================================

/// Whole-collection persistence.
///
/// `load_collection` returns `None` for a collection that has never been
/// saved. `save_collection` replaces the stored payload in one step.
pub trait RecordStore: Send + Sync {
    fn load_collection(
        &self,
        collection: Collection,
    ) -> impl Future<Output = DbResult<Option<String>>> + Send;

    fn save_collection(
        &self,
        collection: Collection,
        payload: String,
    ) -> impl Future<Output = DbResult<()>> + Send;
}

/// Loads and decodes a collection. A missing collection is empty.
pub async fn load_records<S, T>(store: &S, collection: Collection) -> DbResult<Vec<T>>
where
    S: RecordStore,
    T: DeserializeOwned,
{
    match store.load_collection(collection).await? {
        Some(payload) if !payload.trim().is_empty() => Ok(serde_json::from_str(&payload)?),
        _ => Ok(Vec::new()),
    }
}

/// Encodes and saves a whole collection.
pub async fn save_records<S, T>(store: &S, collection: Collection, records: &[T]) -> DbResult<()>
where
    S: RecordStore,
    T: Serialize,
{
    let payload = serde_json::to_string(records)?;
    store.save_collection(collection, payload).await
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// A [`RecordStore`] that lives only as long as the process.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<Collection, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    async fn load_collection(&self, collection: Collection) -> DbResult<Option<String>> {
        Ok(self.collections.read().await.get(&collection).cloned())
    }

    async fn save_collection(&self, collection: Collection, payload: String) -> DbResult<()> {
        self.collections.write().await.insert(collection, payload);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
