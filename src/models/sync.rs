// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wire types for `GET /sync` and `POST /sync`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Category payloads keyed by category name.
pub type CategoryData = BTreeMap<String, Value>;

/// Response to a pull.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PullResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "Record<string, unknown>"))]
    pub data: CategoryData,
    pub timestamp: String,
}

/// Body of a push.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PushRequest {
    #[cfg_attr(feature = "binding-generation", ts(type = "Record<string, unknown>"))]
    pub data: CategoryData,
}

/// Response to a push.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PushResponse {
    pub success: bool,
    pub timestamp: String,
}
