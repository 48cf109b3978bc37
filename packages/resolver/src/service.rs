//! Compile-time embedded configuration of the remote gazetteer service.
//!
//! The service is defined in `services/whosonfirst.toml`. The base URL can
//! be overridden at runtime with the [`BASE_URL_ENV`] environment variable
//! (e.g. to point at a local mirror of the data repository).

use std::path::PathBuf;
use std::time::Duration;

use gazetteer_resolver_models::{DEFAULT_OUTPUT_DIR, LookupOptions};
use serde::Deserialize;

/// Environment variable overriding [`GazetteerService::base_url`].
pub const BASE_URL_ENV: &str = "GAZETTEER_BASE_URL";

/// A gazetteer service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GazetteerService {
    /// Unique identifier (e.g. `"whosonfirst"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Base URL that sharded record paths are appended to.
    pub base_url: String,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum number of redirects followed per request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Delay after each successful fetch in milliseconds.
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,
    /// Directory for the per-ID raw record cache.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_max_redirects() -> usize {
    10
}

const fn default_rate_limit_ms() -> u64 {
    50
}

fn default_cache_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

impl GazetteerService {
    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns lookup options seeded from this service's rate limit and
    /// cache directory.
    #[must_use]
    pub fn lookup_options(&self) -> LookupOptions {
        LookupOptions {
            sleep: Duration::from_millis(self.rate_limit_ms),
            output_dir: PathBuf::from(&self.cache_dir),
            ..LookupOptions::default()
        }
    }
}

const SERVICE_TOML: &str = include_str!("../services/whosonfirst.toml");

/// Returns the embedded service configuration.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (the file is compiled into the
/// binary, so this is caught by the test suite).
#[must_use]
pub fn default_service() -> GazetteerService {
    toml::de::from_str(SERVICE_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse gazetteer service config: {e}"))
}

/// Returns the embedded service configuration with the base URL taken
/// from [`BASE_URL_ENV`] when it is set and non-empty.
#[must_use]
pub fn service_from_env() -> GazetteerService {
    let mut service = default_service();
    if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
        if !base_url.trim().is_empty() {
            log::debug!("Using {BASE_URL_ENV}={base_url}");
            service.base_url = base_url;
        }
    }
    service
}
