// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync API client for pulling and pushing whole categories.
//!
//! Handles:
//! - Pull (`GET /sync`) and push (`POST /sync`) with a bearer token
//! - Request timeouts
//! - Classifying failures: 401/403 become [`AppError::AuthRejected`]
//!   (session over), everything else is a transient [`AppError::Transport`]

use crate::error::AppError;
use crate::models::{CategoryData, PullResponse, PushRequest, PushResponse};
use serde::Deserialize;
use std::time::Duration;

/// Sync API client.
#[derive(Clone)]
pub struct SyncClient {
    http: reqwest::Client,
    base_url: String,
}

impl SyncClient {
    /// Create a client for the sync server at `base_url`.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn sync_url(&self) -> String {
        format!("{}/sync", self.base_url)
    }

    /// Fetch every category the server holds for this account.
    pub async fn pull(&self, token: &str) -> Result<PullResponse, AppError> {
        let response = self
            .http
            .get(self.sync_url())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Pull request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Send the full set of categories; the server stores all or none.
    pub async fn push(&self, token: &str, data: CategoryData) -> Result<PushResponse, AppError> {
        let response = self
            .http
            .post(self.sync_url())
            .bearer_auth(token)
            .json(&PushRequest { data })
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Push request failed: {}", e)))?;

        let body: PushResponse = self.check_response_json(response).await?;
        if !body.success {
            return Err(AppError::Transport(
                "Server reported an unsuccessful push".to_string(),
            ));
        }
        Ok(body)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();

        if status.as_u16() == 401 || status.as_u16() == 403 {
            tracing::warn!(status = status.as_u16(), "Sync server rejected credentials");
            return Err(AppError::AuthRejected(status.as_u16()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Transport(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("JSON parse error: {}", e)))
    }
}
