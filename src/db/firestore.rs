// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed category store.
//!
//! Layout: one document per (account, category) in `sync_categories`.
//! The payload is stored as a JSON string so arbitrary client shapes
//! (nulls, nested arrays, mixed types) survive Firestore's value model.

use crate::db::collections;
use crate::error::AppError;
use crate::models::CategoryData;
use crate::time_utils::now_rfc3339;
use serde::{Deserialize, Serialize};

// Firestore limits a transaction to 500 writes. One account has a handful
// of categories, so this only guards against abusive pushes.
const MAX_CATEGORIES_PER_PUSH: usize = 400;

/// Stored category document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDocument {
    pub account_id: String,
    pub category: String,
    /// Category payload serialized as JSON
    pub payload_json: String,
    /// Last write time (ISO 8601)
    pub updated_at: String,
}

/// Document ID for an (account, category) pair.
pub fn document_id(account_id: &str, category: &str) -> String {
    format!(
        "{}__{}",
        urlencoding::encode(account_id),
        urlencoding::encode(category)
    )
}

/// Firestore category store client.
#[derive(Clone)]
pub struct FirestoreCategoryStore {
    client: firestore::FirestoreDb,
}

impl FirestoreCategoryStore {
    /// Connect to Firestore.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore (Emulator)");

        Ok(Self { client })
    }

    /// Load every category stored for an account.
    pub async fn get(&self, account_id: &str) -> Result<CategoryData, AppError> {
        let owner = account_id.to_string();
        let documents: Vec<CategoryDocument> = self
            .client
            .fluent()
            .select()
            .from(collections::SYNC_CATEGORIES)
            .filter(move |q| q.for_all([q.field("account_id").eq(owner.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut data = CategoryData::new();
        for doc in documents {
            match serde_json::from_str(&doc.payload_json) {
                Ok(payload) => {
                    data.insert(doc.category, payload);
                }
                Err(e) => {
                    // Skip the category; the client keeps its local copy.
                    tracing::warn!(
                        account_id,
                        category = %doc.category,
                        error = %e,
                        "Stored category payload is not valid JSON"
                    );
                }
            }
        }

        Ok(data)
    }

    /// Upsert all categories in a single transaction.
    pub async fn put_all(&self, account_id: &str, data: &CategoryData) -> Result<(), AppError> {
        if data.len() > MAX_CATEGORIES_PER_PUSH {
            return Err(AppError::BadRequest(format!(
                "Too many categories in one push ({})",
                data.len()
            )));
        }

        let now = now_rfc3339();
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for (category, payload) in data {
            let doc = CategoryDocument {
                account_id: account_id.to_string(),
                category: category.clone(),
                payload_json: serde_json::to_string(payload)
                    .map_err(|e| AppError::Internal(e.into()))?,
                updated_at: now.clone(),
            };

            self.client
                .fluent()
                .update()
                .in_col(collections::SYNC_CATEGORIES)
                .document_id(document_id(account_id, category))
                .object(&doc)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!(
                        "Failed to add category {} to transaction: {}",
                        category, e
                    ))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            account_id,
            categories = data.len(),
            "Categories committed atomically"
        );

        Ok(())
    }
}
