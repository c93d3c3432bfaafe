//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TEESHOP_BACKEND_URL` - Base URL of the hosted backend (e.g. `https://abc.supabase.co`)
//! - `TEESHOP_BACKEND_ANON_KEY` - Public API key sent with every backend request
//!
//! ## Optional
//! - `TEESHOP_ACCESS_TOKEN` - Bearer token of the signed-in user
//! - `TEESHOP_USER_ID` - UUID of the signed-in user
//! - `TEESHOP_USER_EMAIL` - Email of the signed-in user (for error reports)
//! - `TEESHOP_DATA_DIR` - Directory for device-local state (default: .teeshop)
//! - `TEESHOP_REQUEST_TIMEOUT_SECS` - Timeout for each backend call (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! A session is signed in only when both `TEESHOP_USER_ID` and
//! `TEESHOP_ACCESS_TOKEN` are set.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use teeshop_core::UserId;

use crate::session::CurrentUser;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
    "add-your",
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

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Hosted backend connection settings
    pub backend: BackendConfig,
    /// Signed-in identity, if any
    pub session: Option<SessionConfig>,
    /// Directory holding device-local state such as the cart
    pub data_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Hosted backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL, without the `/rest/v1` suffix
    pub url: Url,
    /// Public API key (sent as `apikey`)
    pub anon_key: SecretString,
    /// Upper bound on every backend call
    pub request_timeout: Duration,
}

/// Identity of the signed-in user.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct SessionConfig {
    pub user_id: UserId,
    pub email: Option<String>,
    pub access_token: SecretString,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl SessionConfig {
    /// The identity as seen by the session provider.
    #[must_use]
    pub fn current_user(&self) -> CurrentUser {
        CurrentUser {
            id: self.user_id,
            email: self.email.clone(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend = BackendConfig::from_env()?;
        let session = SessionConfig::from_env()?;
        let data_dir = PathBuf::from(get_env_or_default("TEESHOP_DATA_DIR", ".teeshop"));

        Ok(Self {
            backend,
            session,
            data_dir,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_url = get_required_env("TEESHOP_BACKEND_URL")?;
        let url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("TEESHOP_BACKEND_URL".to_string(), e.to_string())
        })?;
        let timeout_secs = get_env_or_default(
            "TEESHOP_REQUEST_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("TEESHOP_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            url,
            anon_key: get_validated_secret("TEESHOP_BACKEND_ANON_KEY")?,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Root of the row-level query API.
    #[must_use]
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url.as_str().trim_end_matches('/'))
    }
}

impl SessionConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let (Some(user_id), Some(token)) = (
            get_optional_env("TEESHOP_USER_ID"),
            get_optional_env("TEESHOP_ACCESS_TOKEN"),
        ) else {
            return Ok(None);
        };

        let user_id = user_id.parse::<UserId>().map_err(|e| {
            ConfigError::InvalidEnvVar("TEESHOP_USER_ID".to_string(), e.to_string())
        })?;

        Ok(Some(Self {
            user_id,
            email: get_optional_env("TEESHOP_USER_EMAIL"),
            access_token: SecretString::from(token),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
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

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Copy the key from the backend dashboard."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
