// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - client-side sync logic.

pub mod credentials;
pub mod engine;
pub mod healing;
pub mod local_store;
pub mod reconcile;
pub mod scheduler;
pub mod transport;

pub use credentials::{CredentialProvider, StaticCredentials};
pub use engine::{SyncEngine, SyncHandle, SyncStatus};
pub use local_store::{LocalStore, RemoteApply};
pub use reconcile::{reconcile, MergeReport, ReconcileOutcome};
pub use scheduler::{SyncAction, SyncScheduler};
pub use transport::SyncClient;
