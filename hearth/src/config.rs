//! Configuration constants and defaults for hearth
//!
//! Values can be set programmatically through [`ConfigBuilder`] or read from
//! the environment (and a `.env` file) with [`HearthConfig::from_env`].

use std::{fmt::Display, str::FromStr, time::Duration};

use crate::{
    error::ConfigError,
    session::{SameSite, SessionConfig},
};

/// Runtime configuration for the backend client, migrations and sessions
#[derive(Debug, Clone)]
pub struct HearthConfig {
    /// Base URL of the collections backend
    pub backend_url: String,

    /// Timeout applied to every backend request
    pub request_timeout: Duration,

    /// Connection string of the schema store, when it is not in memory
    pub database_url: Option<String>,

    /// Prefix of the schema store and migration ledger tables
    pub table_prefix: String,

    /// `tracing` filter used when `RUST_LOG` is not set
    pub log_filter: String,

    pub session: SessionConfig,
}

impl Default for HearthConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_owned(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            database_url: None,
            table_prefix: DEFAULT_TABLE_PREFIX.to_owned(),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            session: SessionConfig::default(),
        }
    }
}

/// Default collections backend, a local development instance
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8090";

/// Default timeout for backend requests
///
/// A request that times out is reported as a transport error.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default prefix for `{prefix}_collection` and `{prefix}_migration`
pub const DEFAULT_TABLE_PREFIX: &str = "hearth";

pub const DEFAULT_LOG_FILTER: &str = "info";

impl HearthConfig {
    /// Loads `.env` if present, then reads `HEARTH_*` and `DATABASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`HearthConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::new();
        let mut session = SessionConfig::default();

        if let Some(url) = lookup("HEARTH_BACKEND_URL") {
            builder = builder.backend_url(url);
        }

        if let Some(secs) = lookup("HEARTH_REQUEST_TIMEOUT_SECS") {
            builder = builder.request_timeout(Duration::from_secs(parse(
                "HEARTH_REQUEST_TIMEOUT_SECS",
                &secs,
            )?));
        }

        if let Some(url) = lookup("DATABASE_URL") {
            builder = builder.database_url(url);
        }

        if let Some(prefix) = lookup("HEARTH_TABLE_PREFIX") {
            builder = builder.table_prefix(prefix);
        }

        if let Some(filter) = lookup("HEARTH_LOG") {
            builder = builder.log_filter(filter);
        }

        if let Some(secret) = lookup("HEARTH_SESSION_SECRET") {
            session.secret = secret;
        }

        if let Some(name) = lookup("HEARTH_SESSION_NAME") {
            session.name = name;
        }

        if let Some(secs) = lookup("HEARTH_SESSION_MAX_AGE_SECS") {
            session.max_age = Duration::from_secs(parse("HEARTH_SESSION_MAX_AGE_SECS", &secs)?);
        }

        if let Some(secure) = lookup("HEARTH_SESSION_SECURE") {
            session.secure = parse("HEARTH_SESSION_SECURE", &secure)?;
        }

        if let Some(same_site) = lookup("HEARTH_SESSION_SAME_SITE") {
            session.same_site = parse::<SameSite>("HEARTH_SESSION_SAME_SITE", &same_site)?;
        }

        Ok(builder.session(session).build())
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key: key.to_owned(),
        reason: e.to_string(),
    })
}

/// Configuration builder for customizing hearth behavior
#[derive(Debug)]
pub struct ConfigBuilder {
    config: HearthConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values
    pub fn new() -> Self {
        Self {
            config: HearthConfig::default(),
        }
    }

    pub fn backend_url(mut self, url: impl Into<String>) -> Self {
        self.config.backend_url = url.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    pub fn table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.table_prefix = prefix.into();
        self
    }

    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.log_filter = filter.into();
        self
    }

    pub fn session(mut self, session: SessionConfig) -> Self {
        self.config.session = session;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> HearthConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
