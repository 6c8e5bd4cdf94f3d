//! Application configuration loaded from environment variables.
//!
//! The server reads [`Config`] once at startup. Sync clients embedding the
//! engine build a [`ClientConfig`], either from defaults or from the
//! environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default cap on a push body (10 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Which backend holds the per-account categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Firestore,
    /// Process-local store, for development and tests.
    Memory,
}

/// Server configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Storage backend for sync categories
    pub storage: StorageBackend,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
    /// JWT signing key for bearer tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let storage = match env::var("SYNC_STORAGE").as_deref() {
            Ok("memory") => StorageBackend::Memory,
            Ok("firestore") | Err(_) => StorageBackend::Firestore,
            Ok(_) => return Err(ConfigError::Invalid("SYNC_STORAGE")),
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            storage,
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_BODY_BYTES),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Config for tests: in-memory storage and a fixed signing key.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            storage: StorageBackend::Memory,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

/// Client-side sync configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the sync server (no trailing slash)
    pub api_url: String,
    /// Quiet period after the last local mutation before pushing
    pub debounce: Duration,
    /// Interval between background pulls
    pub poll_interval: Duration,
    /// Per-request timeout for pull/push
    pub request_timeout: Duration,
    /// Where the local snapshot is persisted, if anywhere
    pub snapshot_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            debounce: Duration::from_secs(2),
            poll_interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(15),
            snapshot_path: None,
        }
    }
}

impl ClientConfig {
    /// Load client configuration, falling back to defaults per field.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            api_url: env::var("SYNC_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            debounce: duration_var("SYNC_DEBOUNCE_MS", Duration::from_millis)?
                .unwrap_or(defaults.debounce),
            poll_interval: duration_var("SYNC_POLL_INTERVAL_SECS", Duration::from_secs)?
                .unwrap_or(defaults.poll_interval),
            request_timeout: duration_var("SYNC_REQUEST_TIMEOUT_SECS", Duration::from_secs)?
                .unwrap_or(defaults.request_timeout),
            snapshot_path: env::var("SYNC_SNAPSHOT_PATH").ok().map(PathBuf::from),
        })
    }
}

fn duration_var(
    name: &'static str,
    unit: fn(u64) -> Duration,
) -> Result<Option<Duration>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|v| Some(unit(v)))
            .map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
