//! Environment-derived settings.

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STATE_DIR: &str = ".storefront-state";

#[derive(Clone, Debug)]
pub struct Settings {
    /// Backend origin, without a trailing `/api`.
    pub api_base: String,
    pub request_timeout: Duration,
    /// Directory for the single-use local snapshots.
    pub storage_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            storage_dir: PathBuf::from(DEFAULT_STATE_DIR),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(base) = std::env::var("STOREFRONT_BASE_URL") {
            if !base.is_empty() {
                settings.api_base = base;
            }
        }
        if let Some(secs) = std::env::var("STOREFRONT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Ok(dir) = std::env::var("STOREFRONT_STATE_DIR") {
            if !dir.is_empty() {
                settings.storage_dir = PathBuf::from(dir);
            }
        }
        settings
    }
}
