//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; only needed with the `postgres` store)
//!
//! ## Optional
//! - `CATALOG_STORE` - Storage backend, `postgres` or `memory` (default: postgres)
//! - `CATALOG_HOST` - Bind address (default: 127.0.0.1)
//! - `CATALOG_PORT` - Listen port (default: 8000)
//! - `CATALOG_DEFAULT_PAGE_SIZE` - List page size when none is requested (default: 20)
//! - `CATALOG_MAX_PAGE_SIZE` - Largest page size a client may request (default: 100)
//! - `LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where catalog data is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// `PostgreSQL` via sqlx.
    Postgres,
    /// Process memory; data is lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store '{other}', expected postgres or memory")),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}', expected text or json")),
        }
    }
}

/// Pagination limits for product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSettings {
    /// Page size used when the client does not ask for one.
    pub default_size: u64,
    /// Largest page size a client may ask for.
    pub max_size: u64,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            default_size: 20,
            max_size: 100,
        }
    }
}

/// Catalog service configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Storage backend
    pub store: StoreBackend,
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Product list pagination limits
    pub pages: PageSettings,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            store: StoreBackend::Memory,
            database_url: None,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8000,
            pages: PageSettings::default(),
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(env: Lookup<'_>) -> Result<Self, ConfigError> {
        let store: StoreBackend = parse_env(env, "CATALOG_STORE", "postgres")?;
        let database_url = match store {
            StoreBackend::Postgres => Some(Self::database_url_from_lookup(env)?),
            StoreBackend::Memory => None,
        };
        let host: IpAddr = parse_env(env, "CATALOG_HOST", "127.0.0.1")?;
        let port: u16 = parse_env(env, "CATALOG_PORT", "8000")?;

        let pages = PageSettings {
            default_size: parse_env(env, "CATALOG_DEFAULT_PAGE_SIZE", "20")?,
            max_size: parse_env(env, "CATALOG_MAX_PAGE_SIZE", "100")?,
        };
        if pages.default_size == 0 || pages.default_size > pages.max_size {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_DEFAULT_PAGE_SIZE".to_string(),
                format!("must be between 1 and {}", pages.max_size),
            ));
        }

        let log_format: LogFormat = parse_env(env, "LOG_FORMAT", "text")?;
        let sentry_dsn = get_optional_env(env, "SENTRY_DSN");
        let sentry_environment = get_optional_env(env, "SENTRY_ENVIRONMENT");
        let sentry_sample_rate = parse_rate(env, "SENTRY_SAMPLE_RATE", "1.0")?;
        let sentry_traces_sample_rate = parse_rate(env, "SENTRY_TRACES_SAMPLE_RATE", "0.1")?;

        Ok(Self {
            store,
            database_url,
            host,
            port,
            pages,
            log_format,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Resolve only the database URL, for tools that need nothing else.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if neither `CATALOG_DATABASE_URL`
    /// nor `DATABASE_URL` is set.
    pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::database_url_from_lookup(&|key: &str| std::env::var(key).ok())
    }

    /// Resolve the database URL through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no URL is set.
    pub fn database_url_from_lookup(env: Lookup<'_>) -> Result<SecretString, ConfigError> {
        get_database_url(env, "CATALOG_DATABASE_URL")
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup used while loading configuration.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(env: Lookup<'_>, key: &str) -> Option<String> {
    env(key).filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(env: Lookup<'_>, key: &str, default: &str) -> String {
    get_optional_env(env, key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, using `default` when it is unset.
fn parse_env<T>(env: Lookup<'_>, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(env, key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a sample rate, which must lie between 0.0 and 1.0.
fn parse_rate(env: Lookup<'_>, key: &str, default: &str) -> Result<f32, ConfigError> {
    let rate: f32 = parse_env(env, key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be between 0.0 and 1.0".to_string(),
        ))
    }
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(env: Lookup<'_>, primary_key: &str) -> Result<SecretString, ConfigError> {
    get_optional_env(env, primary_key)
        .or_else(|| get_optional_env(env, "DATABASE_URL"))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ApiConfig::from_lookup(&|key: &str| vars.get(key).cloned())
    }

    #[test]
    fn test_memory_store_needs_no_database() {
        let config = load(&[("CATALOG_STORE", "memory")]).unwrap();
        assert_eq!(config.store, StoreBackend::Memory);
        assert!(config.database_url.is_none());
        assert_eq!(config.port, 8000);
        assert_eq!(config.pages, PageSettings::default());
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "CATALOG_DATABASE_URL"));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/catalog")]).unwrap();
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://localhost/catalog"
        );

        let config = load(&[
            ("CATALOG_DATABASE_URL", "postgres://primary/catalog"),
            ("DATABASE_URL", "postgres://fallback/catalog"),
        ])
        .unwrap();
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://primary/catalog"
        );

        let url = ApiConfig::database_url_from_lookup(&|key: &str| {
            (key == "DATABASE_URL").then(|| "postgres://cli/catalog".to_string())
        })
        .unwrap();
        assert_eq!(url.expose_secret(), "postgres://cli/catalog");
        assert!(ApiConfig::database_url_from_lookup(&|_: &str| None).is_err());
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("CATALOG_STORE", "memory"), ("CATALOG_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "CATALOG_PORT"));

        let err = load(&[("CATALOG_STORE", "redis")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "CATALOG_STORE"));

        let err = load(&[
            ("CATALOG_STORE", "memory"),
            ("CATALOG_DEFAULT_PAGE_SIZE", "200"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_sentry_rates() {
        let config = load(&[("CATALOG_STORE", "memory")]).unwrap();
        assert!((config.sentry_sample_rate - 1.0).abs() < f32::EPSILON);
        assert!((config.sentry_traces_sample_rate - 0.1).abs() < f32::EPSILON);

        let config = load(&[
            ("CATALOG_STORE", "memory"),
            ("SENTRY_TRACES_SAMPLE_RATE", "0.5"),
        ])
        .unwrap();
        assert!((config.sentry_traces_sample_rate - 0.5).abs() < f32::EPSILON);

        let err = load(&[("CATALOG_STORE", "memory"), ("SENTRY_SAMPLE_RATE", "abc")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "SENTRY_SAMPLE_RATE"));

        let err = load(&[
            ("CATALOG_STORE", "memory"),
            ("SENTRY_TRACES_SAMPLE_RATE", "1.5"),
        ])
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "SENTRY_TRACES_SAMPLE_RATE")
        );
    }

    #[test]
    fn test_socket_addr() {
        let config = load(&[
            ("CATALOG_STORE", "memory"),
            ("CATALOG_HOST", "0.0.0.0"),
            ("CATALOG_PORT", "9000"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:9000");
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
