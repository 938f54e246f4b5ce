//! Ingestion configuration
//!
//! Env-var driven with usable defaults for every option, so the pipeline runs
//! with no configuration present. A `.env` file is honored via dotenvy.

use serde::{Deserialize, Serialize};

use super::{Result, ReviewsError};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default reviews API base URL (plain HTTP to sidestep local cert issues).
pub const DEFAULT_API_BASE: &str = "http://localhost:5000";

/// Fixed request timeout applied to every source call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default destination store for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/ds_portfolio";

/// Default destination table name.
pub const DEFAULT_REVIEWS_TABLE: &str = "sentiment_reviews";

/// Default pool size; each phase opens and drops its own small pool.
pub const DEFAULT_STORE_MAX_CONNECTIONS: u32 = 2;

/// Default store connection timeout in seconds.
pub const DEFAULT_STORE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Remote source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the reviews API
    pub base_url: String,

    /// Verify TLS certificates; off by default for local self-signed setups
    pub verify_tls: bool,

    /// Allow the one-shot HTTPS→HTTP downgrade on certificate failure
    pub allow_http_fallback: bool,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Seed demo reviews into the source when it is empty
    pub seed_if_empty: bool,
}

/// Destination store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Destination table, optionally schema-qualified (e.g. "public.reviews")
    pub table: String,

    /// Pool size per phase
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    pub connect_timeout_secs: u64,
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub source: SourceConfig,
    pub store: StoreConfig,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            verify_tls: false,
            allow_http_fallback: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            seed_if_empty: true,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            table: DEFAULT_REVIEWS_TABLE.to_string(),
            max_connections: DEFAULT_STORE_MAX_CONNECTIONS,
            connect_timeout_secs: DEFAULT_STORE_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl SourceConfig {
    /// `http://` rendition of an `https://` base; `None` for an already
    /// insecure base. Drives the fallback transition.
    pub fn insecure_base(&self) -> Option<String> {
        self.base_url
            .strip_prefix("https://")
            .map(|rest| format!("http://{}", rest))
    }
}

impl IngestConfig {
    /// Load configuration from environment variables (and `.env`)
    ///
    /// Recognized variables:
    /// - `API_BASE`, `API_VERIFY`, `API_FALLBACK_HTTP`, `API_TIMEOUT_SECS`,
    ///   `SEED_IF_EMPTY`
    /// - `DATABASE_URL`, `REVIEWS_TABLE`, `DATABASE_MAX_CONNECTIONS`,
    ///   `DATABASE_CONNECT_TIMEOUT`
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = IngestConfig {
            source: SourceConfig {
                base_url: env_or("API_BASE", DEFAULT_API_BASE),
                verify_tls: env_flag("API_VERIFY", false),
                allow_http_fallback: env_flag("API_FALLBACK_HTTP", true),
                timeout_secs: env_parsed("API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
                seed_if_empty: env_flag("SEED_IF_EMPTY", true),
            },
            store: StoreConfig {
                url: env_or("DATABASE_URL", DEFAULT_DATABASE_URL),
                table: env_or("REVIEWS_TABLE", DEFAULT_REVIEWS_TABLE),
                max_connections: env_parsed(
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_STORE_MAX_CONNECTIONS,
                ),
                connect_timeout_secs: env_parsed(
                    "DATABASE_CONNECT_TIMEOUT",
                    DEFAULT_STORE_CONNECT_TIMEOUT_SECS,
                ),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.source.base_url.starts_with("http://")
            && !self.source.base_url.starts_with("https://")
        {
            return Err(ReviewsError::config(format!(
                "API base URL must start with http:// or https://, got '{}'",
                self.source.base_url
            )));
        }

        if self.source.timeout_secs == 0 {
            return Err(ReviewsError::config("API timeout must be greater than 0"));
        }

        if self.store.url.is_empty() {
            return Err(ReviewsError::config("Store URL cannot be empty"));
        }

        if self.store.max_connections == 0 {
            return Err(ReviewsError::config(
                "Store max_connections must be greater than 0",
            ));
        }

        // Identifiers cannot be bound as SQL parameters, so the table name is
        // locked down before it is ever formatted into a statement.
        if !is_valid_table_name(&self.store.table) {
            return Err(ReviewsError::config(format!(
                "Invalid table name '{}': expected [schema.]identifier with [A-Za-z0-9_] characters",
                self.store.table
            )));
        }

        Ok(())
    }
}

/// Check a (possibly schema-qualified) table name against identifier rules
pub fn is_valid_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    !parts.is_empty() && parts.len() <= 2 && parts.iter().all(|p| is_valid_identifier(p))
}

fn is_valid_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Boolean flags follow the original convention: only the literal "true"
/// (case-insensitive) switches a flag on.
fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(value) => value.trim().eq_ignore_ascii_case("true"),
        Err(_) => default,
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
