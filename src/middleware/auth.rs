// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer JWT authentication middleware.
//!
//! Tokens are issued elsewhere; this layer only verifies them and scopes
//! the request to the account named in `sub`.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated account extracted from JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account_id: String,
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware that requires a valid bearer JWT.
///
/// 401 for a missing, malformed, or expired token. 403 for a correctly
/// signed token that names no account.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let key = DecodingKey::from_secret(&state.config.jwt_signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        StatusCode::UNAUTHORIZED
    })?;

    let account_id = token_data.claims.sub.trim().to_string();
    if account_id.is_empty() {
        tracing::warn!("Signed token without an account subject");
        return Err(StatusCode::FORBIDDEN);
    }

    request.extensions_mut().insert(AuthUser { account_id });

    Ok(next.run(request).await)
}
