//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SOUQ_BACKEND_URL` - Base URL of the hosted backend (e.g., `https://xyz.example.co`)
//! - `SOUQ_ANON_KEY` - Public API key sent with every request
//!
//! ## Optional
//! - `SOUQ_SERVICE_KEY` - Service-role key enabling the admin write path
//! - `SOUQ_DATA_DIR` - Directory for locally persisted state (default: `.souq`)
//! - `SOUQ_POLL_SECS` - Polling interval when subscriptions are unavailable (default: 10)
//! - `SOUQ_POLL_RETRY_SECS` - Shorter interval used after a failed poll (default: 5)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default polling interval in seconds.
const DEFAULT_POLL_SECS: u64 = 10;
/// Default retry interval after a failed poll, in seconds.
const DEFAULT_POLL_RETRY_SECS: u64 = 5;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "insert",
    "todo",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Souq client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the hosted backend.
    pub backend_url: Url,
    /// Public API key (safe to embed in the app).
    pub anon_key: String,
    /// Service-role key for the admin write path, when configured.
    pub service_key: Option<SecretString>,
    /// Directory for locally persisted state (anonymous cart, favorites).
    pub data_dir: PathBuf,
    /// Polling interval for the degraded refetch loop.
    pub poll_interval: Duration,
    /// Retry interval used after a failed poll, until the next success.
    pub poll_retry_interval: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the service key fails placeholder validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend_url = get_required_env("SOUQ_BACKEND_URL")?
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SOUQ_BACKEND_URL".to_string(), e.to_string())
            })?;
        let anon_key = get_required_env("SOUQ_ANON_KEY")?;

        let service_key = match get_optional_env("SOUQ_SERVICE_KEY") {
            Some(value) => {
                validate_secret_strength(&value, "SOUQ_SERVICE_KEY")?;
                Some(SecretString::from(value))
            }
            None => None,
        };

        let data_dir = PathBuf::from(get_env_or_default("SOUQ_DATA_DIR", ".souq"));
        let poll_interval = get_interval_env("SOUQ_POLL_SECS", DEFAULT_POLL_SECS)?;
        let poll_retry_interval =
            get_interval_env("SOUQ_POLL_RETRY_SECS", DEFAULT_POLL_RETRY_SECS)?;

        Ok(Self {
            backend_url,
            anon_key,
            service_key,
            data_dir,
            poll_interval,
            poll_retry_interval,
        })
    }

    /// Whether the admin write path is available.
    #[must_use]
    pub const fn has_admin_access(&self) -> bool {
        self.service_key.is_some()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a positive seconds value into a `Duration`.
fn get_interval_env(key: &str, default_secs: u64) -> Result<Duration, ConfigError> {
    let raw = get_env_or_default(key, &default_secs.to_string());
    let secs = raw
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "interval must be at least 1 second".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Validate that a secret is not an obvious placeholder.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}
