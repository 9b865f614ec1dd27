// src/config.rs
//
// Client configuration
//
// PRINCIPLES:
// - Defaults work against a local backend
// - File first, then environment overrides
// - Validated once, before any client is built

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::MAX_PAGE_SIZE;
use crate::error::{AppError, AppResult};

pub const ENV_API_URL: &str = "MOAPLAY_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "MOAPLAY_TIMEOUT_SECS";
pub const ENV_SESSION: &str = "MOAPLAY_SESSION";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin, without the `/api` prefix
    pub api_base_url: String,

    /// Per-request timeout
    pub timeout_secs: u64,

    /// Value of the backend session cookie (`session=...`), if logged in
    pub session_cookie: Option<String>,

    pub favorites_page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            timeout_secs: 10,
            session_cookie: None,
            favorites_page_size: 20,
        }
    }
}

impl ClientConfig {
    /// Load from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the default config file if present, then apply the
    /// environment.
    pub fn discover() -> AppResult<Self> {
        let base = match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path)?,
            _ => Self::default(),
        };
        base.with_env()
    }

    /// `{CONFIG_DIR}/moaplay/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("moaplay").join("config.json"))
    }

    /// Apply `MOAPLAY_*` environment overrides
    pub fn with_env(self) -> AppResult<Self> {
        self.overlay(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn overlay<F>(mut self, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = raw.trim().parse().map_err(|_| {
                AppError::Config(format!("{} must be a number of seconds, got {:?}", ENV_TIMEOUT_SECS, raw))
            })?;
        }
        if let Some(session) = lookup(ENV_SESSION) {
            self.session_cookie = if session.is_empty() { None } else { Some(session) };
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> AppResult<()> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "api_base_url must be an http(s) URL, got {:?}",
                self.api_base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::Config("timeout_secs must be positive".to_string()));
        }
        if self.favorites_page_size == 0 || self.favorites_page_size > MAX_PAGE_SIZE {
            return Err(AppError::Config(format!(
                "favorites_page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }
}
