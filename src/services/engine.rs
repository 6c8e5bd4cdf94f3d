// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync engine: the background task that keeps the local store and the
//! server converging.
//!
//! Handles:
//! - Pull on credential acquisition and on the poll interval
//! - Debounced push after local mutations (self-healing pass first)
//! - Bootstrap push when the server has nothing for the account
//! - Hard auth signal (401/403): one logout, timers cancelled, no retry
//! - Soft failures: status `Error`, retried on the normal cadence
//!
//! Pulls and pushes run one at a time on the engine task, so a pull never
//! overlaps a push from the same edit batch.

use crate::config::ClientConfig;
use crate::error::AppError;
use crate::services::credentials::CredentialProvider;
use crate::services::local_store::{LocalStore, RemoteApply};
use crate::services::scheduler::{SyncAction, SyncScheduler};
use crate::services::transport::SyncClient;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// User-visible sync state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Syncing,
    Success,
    Error(String),
    /// Credentials rejected or removed; local data is kept.
    SignedOut,
}

#[derive(Debug)]
enum Command {
    CredentialsAcquired,
    Logout,
    Shutdown,
}

/// Handle to a running engine.
pub struct SyncHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SyncStatus>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// A token became available (login or restore).
    pub fn credentials_acquired(&self) {
        let _ = self.commands.send(Command::CredentialsAcquired);
    }

    /// User logged out: cancel timers. The local snapshot stays on disk.
    pub fn logout(&self) {
        let _ = self.commands.send(Command::Logout);
    }

    pub fn status(&self) -> watch::Receiver<SyncStatus> {
        self.status.clone()
    }

    /// Stop the engine and wait for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Sync engine task ended abnormally");
        }
    }
}

pub struct SyncEngine {
    store: Arc<LocalStore>,
    client: SyncClient,
    credentials: Arc<dyn CredentialProvider>,
    scheduler: SyncScheduler,
    status: watch::Sender<SyncStatus>,
}

impl SyncEngine {
    pub fn new(
        config: &ClientConfig,
        store: Arc<LocalStore>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, AppError> {
        let client = SyncClient::new(&config.api_url, config.request_timeout)?;
        let (status, _) = watch::channel(SyncStatus::Idle);

        Ok(Self {
            store,
            client,
            credentials,
            scheduler: SyncScheduler::new(config.debounce, config.poll_interval),
            status,
        })
    }

    /// Start the engine on the current tokio runtime.
    pub fn spawn(self) -> SyncHandle {
        let (commands, rx) = mpsc::unbounded_channel();
        let status = self.status.subscribe();
        let task = tokio::spawn(self.run(rx));

        SyncHandle {
            commands,
            status,
            task,
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let mut mutations = self.store.subscribe_mutations();
        tracing::info!("Sync engine started");

        loop {
            let deadline = self.scheduler.next_deadline();

            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::CredentialsAcquired) => {
                        tracing::debug!("Credentials acquired, scheduling pull");
                        self.scheduler.on_credentials_acquired(Instant::now());
                    }
                    Some(Command::Logout) => {
                        self.scheduler.on_credentials_lost();
                        self.set_status(SyncStatus::SignedOut);
                    }
                    Some(Command::Shutdown) | None => break,
                },
                changed = mutations.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.scheduler.on_local_mutation(Instant::now());
                }
                _ = sleep_until(deadline) => {}
            }

            while let Some(action) = self.scheduler.take_due(Instant::now()) {
                match action {
                    SyncAction::Pull => self.pull_cycle().await,
                    SyncAction::Push => self.push_cycle().await,
                }
            }
        }

        tracing::info!("Sync engine stopped");
    }

    /// Pull, then merge or bootstrap.
    async fn pull_cycle(&mut self) {
        let Some(token) = self.token() else {
            return;
        };
        self.set_status(SyncStatus::Syncing);

        let response = match self.client.pull(&token).await {
            Ok(response) => response,
            Err(e) => return self.handle_failure("pull", e),
        };

        match self.store.apply_remote_snapshot(&response.data) {
            Ok(RemoteApply::Bootstrap) => {
                tracing::info!("Server has no data for this account, pushing local snapshot");
                self.push_cycle().await;
            }
            Ok(RemoteApply::Merged { diverged, skipped }) => {
                if !skipped.is_empty() {
                    tracing::warn!(?skipped, "Skipped malformed categories from pull");
                }
                if diverged {
                    // Local holds data the server lacks; push it after the debounce.
                    self.store.mark_dirty();
                }
                tracing::debug!(
                    categories = response.data.len(),
                    diverged,
                    server_time = %response.timestamp,
                    "Pull merged"
                );
                self.set_status(SyncStatus::Success);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Merged pull could not be persisted");
                self.set_status(SyncStatus::Error(e.to_string()));
            }
        }
    }

    /// Heal, then push the whole snapshot.
    async fn push_cycle(&mut self) {
        let Some(token) = self.token() else {
            return;
        };
        self.scheduler.begin_push();
        self.set_status(SyncStatus::Syncing);

        match self.store.heal() {
            Ok(0) => {}
            Ok(repaired) => tracing::info!(repaired, "Self-healing pass repaired workout plans"),
            Err(e) => tracing::warn!(error = %e, "Healed snapshot could not be persisted"),
        }

        let data = match self.store.snapshot().to_categories() {
            Ok(data) => data,
            Err(e) => {
                self.scheduler.on_push_finished(Instant::now(), false);
                return self.handle_failure("push", AppError::Internal(e.into()));
            }
        };
        let categories = data.len();

        match self.client.push(&token, data).await {
            Ok(response) => {
                self.scheduler.on_push_finished(Instant::now(), true);
                tracing::debug!(categories, server_time = %response.timestamp, "Push stored");
                self.set_status(SyncStatus::Success);
            }
            Err(e) => {
                if !e.is_auth_fatal() {
                    self.scheduler.on_push_finished(Instant::now(), false);
                }
                self.handle_failure("push", e);
            }
        }
    }

    fn token(&mut self) -> Option<String> {
        let token = self.credentials.current_token();
        if token.is_none() {
            tracing::debug!("No credentials, cancelling sync timers");
            self.scheduler.on_credentials_lost();
            self.set_status(SyncStatus::SignedOut);
        }
        token
    }

    fn handle_failure(&mut self, operation: &'static str, error: AppError) {
        if error.is_auth_fatal() {
            tracing::warn!(operation, error = %error, "Credentials rejected, signing out");
            self.scheduler.on_credentials_lost();
            self.credentials.on_token_invalidated();
            self.set_status(SyncStatus::SignedOut);
        } else {
            tracing::warn!(operation, error = %error, "Sync failed, will retry on schedule");
            self.set_status(SyncStatus::Error(error.to_string()));
        }
    }

    fn set_status(&self, status: SyncStatus) {
        self.status.send_replace(status);
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
