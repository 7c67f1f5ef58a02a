use std::time::Duration;

use tracing::warn;

/// Default marketplace API root.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_API_URL: &str = "DAVYBOT_API_URL";
pub const ENV_API_KEY: &str = "DAVYBOT_API_KEY";
pub const ENV_TIMEOUT: &str = "DAVYBOT_TIMEOUT";

/// Client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Versioned API root, without a trailing slash
    pub api_url: String,
    /// Bearer credential sent as `Authorization: Bearer {key}`
    pub api_key: Option<String>,
    /// Applied to every request
    pub timeout: Duration,
    /// Verify TLS certificates (default: true)
    pub verify_tls: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            verify_tls: true,
        }
    }
}

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub insecure: bool,
}

impl Config {
    /// Load configuration from the environment and CLI arguments
    pub fn load(overrides: &Overrides) -> Self {
        Self::load_with(|key| std::env::var(key).ok(), overrides)
    }

    /// Same as [`Config::load`], reading variables through `env`.
    pub fn load_with<F>(env: F, overrides: &Overrides) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        // Override with environment variables
        if let Some(url) = env(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.api_url = url;
        }
        if let Some(key) = env(ENV_API_KEY).filter(|v| !v.is_empty()) {
            config.api_key = Some(key);
        }
        if let Some(timeout) = env(ENV_TIMEOUT) {
            match timeout.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => warn!(
                    "Ignoring {}={:?}: expected a positive number of seconds",
                    ENV_TIMEOUT, timeout
                ),
            }
        }

        // Override with CLI arguments
        if let Some(url) = &overrides.api_url {
            config.api_url = url.clone();
        }
        if let Some(key) = &overrides.api_key {
            config.api_key = Some(key.clone());
        }
        if let Some(secs) = overrides.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if overrides.insecure {
            config.verify_tls = false;
        }

        config.api_url = config.api_url.trim().trim_end_matches('/').to_string();
        config
    }

    /// Root of the service, one level above the versioned API path.
    pub fn service_root(&self) -> &str {
        self.api_url
            .strip_suffix("/api/v1")
            .unwrap_or(&self.api_url)
    }
}
