//! Proxy configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ACCESS_TOKEN` - Admin API access token (high entropy, not a placeholder)
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 3000)
//! - `API_BASE_PATH` - Route prefix (default: /api)
//! - `SHOPIFY_API_VERSION` - Admin API version (default: 2025-01)
//! - `SHOPIFY_API_BASE_URL` - Override for the Admin REST base URL
//! - `SHOPIFY_APP_SECRET` - Enables app-proxy signature verification
//! - `RATE_LIMIT_MAX_ATTEMPTS` - Attempts for rate-limited calls (default: 3)
//! - `RATE_LIMIT_INITIAL_DELAY_MS` - First backoff delay (default: 1000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//!
//! ## Optional (customer spreadsheet)
//! - `CUSTOMER_SHEET_URL` - CSV export URL (takes precedence)
//! - `GOOGLE_SHEET_ID` - Google Sheet ID, used to build the export URL
//! - `GOOGLE_SHEET_GID` - Tab ID within the sheet
//! - `SHEET_REFRESH_INTERVAL_SECS` - Periodic refresh interval (disabled when unset)
//!
//! ## Optional (enrichment)
//! - `ENRICH_BATCH_SIZE` - Orders enriched concurrently per batch (default: 5)
//! - `ENRICH_BATCH_DELAY_MS` - Pause between batches (default: 100)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_API_VERSION: &str = "2025-01";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
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

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Proxy application configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Prefix for every route (normalized: leading slash, no trailing slash)
    pub base_path: String,
    /// Shopify Admin API configuration
    pub shopify: ShopifyConfig,
    /// Customer spreadsheet configuration
    pub sheet: SheetConfig,
    /// Batch enrichment tuning
    pub enrichment: EnrichmentConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// Log output format
    pub log_format: LogFormat,
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact the access token and app secret.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2025-01)
    pub api_version: String,
    /// Admin API access token
    pub access_token: SecretString,
    /// Base URL override, used for staging stores and tests
    pub api_base_url: Option<String>,
    /// App secret for app-proxy signature verification
    pub app_secret: Option<SecretString>,
    /// Attempts for calls retried on rate limiting
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry
    pub initial_retry_delay: Duration,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field(
                "app_secret",
                &self.app_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("max_attempts", &self.max_attempts)
            .field("initial_retry_delay", &self.initial_retry_delay)
            .finish()
    }
}

impl ShopifyConfig {
    /// Admin REST base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.api_base_url.as_ref().map_or_else(
            || {
                format!(
                    "https://{}/admin/api/{}",
                    self.store.trim_end_matches('/'),
                    self.api_version
                )
            },
            |url| url.trim_end_matches('/').to_string(),
        )
    }

    fn from_env() -> Result<Self, ConfigError> {
        let app_secret = get_optional_env("SHOPIFY_APP_SECRET").map(|secret| {
            if let Err(e) = validate_secret_strength(&secret, "SHOPIFY_APP_SECRET") {
                tracing::warn!("SHOPIFY_APP_SECRET validation warning: {e}");
            }
            SecretString::from(secret)
        });

        Ok(Self {
            store: get_required_env("SHOPIFY_STORE")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            access_token: get_validated_secret("SHOPIFY_ACCESS_TOKEN")?,
            api_base_url: get_optional_env("SHOPIFY_API_BASE_URL"),
            app_secret,
            max_attempts: get_parsed_env("RATE_LIMIT_MAX_ATTEMPTS", 3)?,
            initial_retry_delay: Duration::from_millis(get_parsed_env(
                "RATE_LIMIT_INITIAL_DELAY_MS",
                1000,
            )?),
        })
    }
}

/// Customer spreadsheet configuration.
#[derive(Debug, Clone, Default)]
pub struct SheetConfig {
    /// CSV export URL; `None` leaves the cache empty
    pub export_url: Option<String>,
    /// Periodic refresh interval; `None` refreshes only at startup and on demand
    pub refresh_interval: Option<Duration>,
}

impl SheetConfig {
    /// Load the spreadsheet settings on their own.
    ///
    /// `CUSTOMER_SHEET_URL` takes precedence over `GOOGLE_SHEET_ID`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the refresh interval is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let export_url = get_optional_env("CUSTOMER_SHEET_URL").or_else(|| {
            get_optional_env("GOOGLE_SHEET_ID").map(|id| {
                google_export_url(&id, get_optional_env("GOOGLE_SHEET_GID").as_deref())
            })
        });

        let refresh_interval = match get_optional_env("SHEET_REFRESH_INTERVAL_SECS") {
            Some(raw) => {
                let secs = parse_env_value::<u64>("SHEET_REFRESH_INTERVAL_SECS", &raw)?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            export_url,
            refresh_interval,
        })
    }
}

/// Build the CSV export URL for a publicly shared Google Sheet.
#[must_use]
pub fn google_export_url(sheet_id: &str, gid: Option<&str>) -> String {
    let mut url = format!("https://docs.google.com/spreadsheets/d/{sheet_id}/export?format=csv");
    if let Some(gid) = gid {
        url.push_str("&gid=");
        url.push_str(gid);
    }
    url
}

/// Batch enrichment tuning for the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentConfig {
    /// Orders enriched concurrently per batch (at least 1)
    pub batch_size: usize,
    /// Pause between consecutive batches
    pub batch_delay: Duration,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            batch_delay: Duration::from_millis(100),
        }
    }
}

impl EnrichmentConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let batch_size: usize = get_parsed_env("ENRICH_BATCH_SIZE", 5)?;
        if batch_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ENRICH_BATCH_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            batch_size,
            batch_delay: Duration::from_millis(get_parsed_env("ENRICH_BATCH_DELAY_MS", 100)?),
        })
    }
}

impl ProxyConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;
        let base_path = normalize_base_path(&get_env_or_default("API_BASE_PATH", "/api"));

        let shopify = ShopifyConfig::from_env()?;
        let sheet = SheetConfig::from_env()?;
        let enrichment = EnrichmentConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let log_format = match get_optional_env("LOG_FORMAT").as_deref() {
            Some(format) if format.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            host,
            port,
            base_path,
            shopify,
            sheet,
            enrichment,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            log_format,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Full path of a route under the base path.
    #[must_use]
    pub fn route_path(&self, route: &str) -> String {
        format!("{}{route}", self.base_path)
    }
}

/// Normalize a route prefix to `/prefix` form; root becomes the empty string.
#[must_use]
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get a numeric environment variable, rejecting unparsable values.
fn get_parsed_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| parse_env_value(key, &raw))
}

fn parse_env_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
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
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the token issued by Shopify."
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
