// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Gym-Sync: local-first synchronization for personal training data
//!
//! This crate provides both halves of the sync protocol: the HTTP server
//! that stores whole categories per account, and the client-side engine
//! (local snapshot store, reconciler, self-healing pass, scheduler, and
//! transport) that keeps each device's copy converging with it.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::CategoryStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: CategoryStore,
}
