// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync routes: whole-category pull and push for the authenticated account.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{PullResponse, PushRequest, PushResponse};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use std::sync::Arc;

/// Sync routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/sync", get(pull).post(push))
}

/// Return every stored category for the account.
async fn pull(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<PullResponse>> {
    let data = state.store.get(&user.account_id).await?;

    tracing::debug!(
        account_id = %user.account_id,
        categories = data.len(),
        "Pull served"
    );

    Ok(Json(PullResponse {
        data,
        timestamp: now_rfc3339(),
    }))
}

/// Store every supplied category for the account, all or nothing.
async fn push(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<PushRequest>,
) -> Result<Json<PushResponse>> {
    state.store.put_all(&user.account_id, &request.data).await?;

    tracing::info!(
        account_id = %user.account_id,
        categories = request.data.len(),
        "Push stored"
    );

    Ok(Json(PushResponse {
        success: true,
        timestamp: now_rfc3339(),
    }))
}
