// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local Snapshot Store: the client's copy of the account between syncs.
//!
//! All writes go through two entry points:
//! - [`LocalStore::apply_local_mutation`] for user edits. Commits in memory
//!   immediately, bumps the mutation generation the scheduler watches, then
//!   persists.
//! - [`LocalStore::apply_remote_snapshot`] for pulls. Runs the reconciler
//!   and swaps in the merged snapshot without counting as a user edit.
//!
//! Readers (UI, analytics) subscribe to a `watch` channel and never write.

use crate::error::AppError;
use crate::models::{CategoryData, Snapshot};
use crate::services::healing::heal;
use crate::services::reconcile::{reconcile, ReconcileOutcome};
use std::path::{Path, PathBuf};
use tokio::sync::watch;

/// What a pull did to the local snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteApply {
    /// Server has no data for this account; local should be pushed as-is.
    Bootstrap,
    Merged {
        /// Merged snapshot differs from what the server holds.
        diverged: bool,
        /// Remote categories skipped as malformed.
        skipped: Vec<String>,
    },
}

pub struct LocalStore {
    snapshot: watch::Sender<Snapshot>,
    mutations: watch::Sender<u64>,
    path: Option<PathBuf>,
}

impl LocalStore {
    /// A store that lives only in memory, seeded with a default profile.
    pub fn in_memory() -> Self {
        Self::with_snapshot(Snapshot::seeded(), None)
    }

    /// Open the store persisted at `path`.
    ///
    /// A missing or unreadable file yields a freshly seeded snapshot.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let snapshot = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(snapshot) => {
                    tracing::info!(path = %path.display(), "Hydrated local snapshot");
                    snapshot
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Local snapshot unreadable, starting fresh"
                    );
                    Snapshot::seeded()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::seeded(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read local snapshot");
                Snapshot::seeded()
            }
        };
        Self::with_snapshot(snapshot, Some(path))
    }

    fn with_snapshot(snapshot: Snapshot, path: Option<PathBuf>) -> Self {
        let (snapshot, _) = watch::channel(snapshot);
        let (mutations, _) = watch::channel(0);
        Self {
            snapshot,
            mutations,
            path,
        }
    }

    /// Clone of the current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    /// Read-only view that updates on every change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.subscribe()
    }

    /// Generation counter bumped by each local mutation.
    pub fn subscribe_mutations(&self) -> watch::Receiver<u64> {
        self.mutations.subscribe()
    }

    /// Apply a user edit.
    ///
    /// The in-memory snapshot is updated even when persisting fails; the
    /// error only means the edit won't survive a reload.
    pub fn apply_local_mutation<F>(&self, mutate: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut Snapshot),
    {
        self.snapshot.send_modify(mutate);
        self.mark_dirty();
        self.persist()
    }

    /// Flag the snapshot as needing a push without changing it.
    pub fn mark_dirty(&self) {
        self.mutations.send_modify(|generation| *generation += 1);
    }

    /// Merge a pulled set of categories into the local snapshot.
    ///
    /// Reconciliation runs under the snapshot's write lock so a concurrent
    /// local mutation is never overwritten by a stale merge.
    pub fn apply_remote_snapshot(&self, remote: &CategoryData) -> Result<RemoteApply, AppError> {
        let mut outcome = None;
        let changed = self.snapshot.send_if_modified(|current| {
            match reconcile(current, remote) {
                ReconcileOutcome::Bootstrap => false,
                ReconcileOutcome::Merged(report) => {
                    let changed = report.snapshot != *current;
                    if changed {
                        *current = report.snapshot;
                    }
                    outcome = Some(report.skipped);
                    changed
                }
            }
        });

        let Some(skipped) = outcome else {
            return Ok(RemoteApply::Bootstrap);
        };

        let merged_data = self
            .snapshot
            .borrow()
            .to_categories()
            .map_err(|e| AppError::Internal(e.into()))?;
        let diverged = &merged_data != remote;

        if changed {
            self.persist()?;
        }
        Ok(RemoteApply::Merged { diverged, skipped })
    }

    /// Run the self-healing pass in place and return how many plans it fixed.
    ///
    /// Derived fields don't count as a user edit, so this doesn't mark the
    /// store dirty.
    pub fn heal(&self) -> Result<usize, AppError> {
        let mut repaired = 0;
        let changed = self.snapshot.send_if_modified(|current| {
            let (healed, count) = heal(std::mem::take(current));
            *current = healed;
            repaired = count;
            count > 0
        });
        if changed {
            self.persist()?;
        }
        Ok(repaired)
    }

    /// Write the snapshot to disk, if this store has a path.
    fn persist(&self) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let bytes = serde_json::to_vec(&*self.snapshot.borrow())
            .map_err(|e| AppError::Persistence(e.to_string()))?;

        // Write-then-rename so a crash never leaves a truncated file.
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, bytes)
            .and_then(|_| std::fs::rename(&tmp, path))
            .map_err(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Failed to persist snapshot");
                AppError::Persistence(format!("{}: {}", path.display(), e))
            })
    }
}
