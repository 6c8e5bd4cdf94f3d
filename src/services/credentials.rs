// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential seam between the sync engine and the login layer.

use std::sync::{Arc, Mutex};

/// Supplies the bearer token and receives the forced-logout signal.
///
/// Token issuance and login UI live outside this crate.
pub trait CredentialProvider: Send + Sync {
    /// Current bearer token, if signed in.
    fn current_token(&self) -> Option<String>;

    /// The server rejected the token: clear it and sign the user out.
    fn on_token_invalidated(&self);
}

type LogoutCallback = Box<dyn Fn() + Send + Sync>;

/// Token held in memory with an optional logout callback.
#[derive(Clone, Default)]
pub struct StaticCredentials {
    token: Arc<Mutex<Option<String>>>,
    on_logout: Arc<Option<LogoutCallback>>,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(Mutex::new(Some(token.into()))),
            on_logout: Arc::new(None),
        }
    }

    /// Invoke `callback` whenever the token is invalidated.
    pub fn with_logout_callback(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_logout = Arc::new(Some(Box::new(callback)));
        self
    }

    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.lock() {
            *slot = token;
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn current_token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|slot| slot.clone())
    }

    fn on_token_invalidated(&self) {
        self.set_token(None);
        if let Some(callback) = self.on_logout.as_ref() {
            callback();
        }
    }
}
