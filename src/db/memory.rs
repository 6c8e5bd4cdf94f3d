// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory category store.
//!
//! Each account's categories live in one map that is replaced wholesale
//! while the account's shard lock is held, so a concurrent `get` observes
//! either the old or the new set of categories, never a mix.

use crate::error::AppError;
use crate::models::CategoryData;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Sentinel meaning "no failure injected".
const NO_FAILURE: usize = usize::MAX;

#[derive(Clone)]
pub struct MemoryCategoryStore {
    accounts: Arc<DashMap<String, CategoryData>>,
    /// Fail a `put_all` after staging this many categories.
    fail_after: Arc<AtomicUsize>,
}

impl Default for MemoryCategoryStore {
    fn default() -> Self {
        Self {
            accounts: Arc::new(DashMap::new()),
            fail_after: Arc::new(AtomicUsize::new(NO_FAILURE)),
        }
    }
}

impl MemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `put_all` fail after `staged` categories were written
    /// to its staging copy. The injection is consumed by that call.
    pub fn inject_failure_after(&self, staged: usize) {
        self.fail_after.store(staged, Ordering::SeqCst);
    }

    pub fn get(&self, account_id: &str) -> Result<CategoryData, AppError> {
        Ok(self
            .accounts
            .get(account_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    pub fn put_all(&self, account_id: &str, data: &CategoryData) -> Result<(), AppError> {
        let fail_after = self.fail_after.swap(NO_FAILURE, Ordering::SeqCst);

        let mut entry = self.accounts.entry(account_id.to_string()).or_default();
        let mut staged = entry.value().clone();

        for (written, (category, payload)) in data.iter().enumerate() {
            if written == fail_after {
                tracing::warn!(
                    account_id,
                    category = %category,
                    "Injected failure while staging categories"
                );
                return Err(AppError::Database(format!(
                    "Injected failure before writing category {}",
                    category
                )));
            }
            staged.insert(category.clone(), payload.clone());
        }

        *entry.value_mut() = staged;

        tracing::debug!(
            account_id,
            categories = data.len(),
            "Categories committed (memory)"
        );
        Ok(())
    }
}
