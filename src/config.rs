//! TOML configuration for a check run.
//!
//! Lookup order: an explicit path, then the `POSTCHECK_CONFIG` environment
//! variable, then `./postcheck.toml`, then compiled-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const CONFIG_ENV: &str = "POSTCHECK_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "postcheck.toml";
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Root of the API under test; `/posts` is appended.
    pub base_url: String,
    /// JSON file with the post payloads.
    pub fixtures_path: PathBuf,
    /// CSV file the results are appended to.
    pub results_path: PathBuf,
    /// Upper bound for the DELETE response time check, in milliseconds.
    pub response_time_budget_ms: u64,
    /// Per-request timeout. Unset means the HTTP client default.
    pub request_timeout_secs: Option<u64>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            fixtures_path: PathBuf::from("test_data.json"),
            results_path: PathBuf::from("results.csv"),
            response_time_budget_ms: 2000,
            request_timeout_secs: None,
        }
    }
}

impl SuiteConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded postcheck configuration");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve the configuration. An explicit path must load; the fallbacks
    /// only warn when they exist but are unreadable.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return Ok(cfg),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "{CONFIG_ENV} set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            match Self::load(local) {
                Ok(cfg) => return Ok(cfg),
                Err(e) => {
                    warn!(
                        path = %local.display(),
                        error = %e,
                        "config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file found, using compiled-in defaults");
        Ok(Self::default())
    }

    pub fn response_time_budget(&self) -> Duration {
        Duration::from_millis(self.response_time_budget_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
