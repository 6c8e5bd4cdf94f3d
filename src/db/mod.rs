//! Server Category Store: durable per-account, per-category payloads.
//!
//! The store never merges. It keeps exactly what a push supplies for each
//! category, and `put_all` is all-or-nothing across the categories in one
//! call. Two backends share this contract: Firestore for deployments and an
//! in-memory map for local development and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreCategoryStore;
pub use memory::MemoryCategoryStore;

use crate::error::AppError;
use crate::models::CategoryData;

/// Collection names as constants.
pub mod collections {
    /// One document per (account, category)
    pub const SYNC_CATEGORIES: &str = "sync_categories";
}

/// Category store handle shared by the HTTP handlers.
#[derive(Clone)]
pub enum CategoryStore {
    Firestore(FirestoreCategoryStore),
    Memory(MemoryCategoryStore),
}

impl CategoryStore {
    /// Every stored category for the account. Empty for an unknown account.
    pub async fn get(&self, account_id: &str) -> Result<CategoryData, AppError> {
        match self {
            CategoryStore::Firestore(store) => store.get(account_id).await,
            CategoryStore::Memory(store) => store.get(account_id),
        }
    }

    /// Upsert every supplied category for the account atomically.
    pub async fn put_all(&self, account_id: &str, data: &CategoryData) -> Result<(), AppError> {
        if data.is_empty() {
            return Ok(());
        }
        if let Some(name) = data.keys().find(|name| name.trim().is_empty()) {
            return Err(AppError::BadRequest(format!(
                "Invalid category name: {:?}",
                name
            )));
        }

        match self {
            CategoryStore::Firestore(store) => store.put_all(account_id, data).await,
            CategoryStore::Memory(store) => store.put_all(account_id, data),
        }
    }
}

impl From<FirestoreCategoryStore> for CategoryStore {
    fn from(store: FirestoreCategoryStore) -> Self {
        CategoryStore::Firestore(store)
    }
}

impl From<MemoryCategoryStore> for CategoryStore {
    fn from(store: MemoryCategoryStore) -> Self {
        CategoryStore::Memory(store)
    }
}
