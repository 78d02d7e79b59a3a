use std::time::Duration;
use strum_macros::{Display, EnumString};

use crate::random::RANDOM_ORG_URL;
use crate::shared::AppError;

/// Which random source battles draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum RandomSourceKind {
    /// random.org over HTTP
    #[default]
    Remote,
    /// Local PRNG
    Local,
}

/// Runtime configuration, read from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Postgres connection string; the in-memory catalog is used when unset
    pub database_url: Option<String>,
    pub random_source: RandomSourceKind,
    pub random_org_url: String,
    pub random_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            random_source: RandomSourceKind::Remote,
            random_org_url: RANDOM_ORG_URL.to_string(),
            random_timeout: Duration::from_secs(5),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys take defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let random_source: RandomSourceKind = match lookup("RANDOM_SOURCE") {
            Some(value) => value.parse().map_err(|_| {
                AppError::Config(format!(
                    "RANDOM_SOURCE must be 'remote' or 'local', got '{}'",
                    value
                ))
            })?,
            None => defaults.random_source,
        };

        // Allow configuring the timeout, default to 5 seconds
        let random_timeout = lookup("RANDOM_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.random_timeout);

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            random_source,
            random_org_url: lookup("RANDOM_ORG_URL").unwrap_or(defaults.random_org_url),
            random_timeout,
        })
    }
}
