//! Runtime configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

/// Credentials for the administrator seeded into an empty store.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// External search provider settings. A provider is only attempted when its key is set.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub serper_api_key: Option<String>,
    pub serper_base_url: String,
    pub brave_api_key: Option<String>,
    pub brave_base_url: String,
    pub timeout: Duration,
    pub cache_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub snapshot_path: PathBuf,
    pub snapshot_interval: Duration,
    pub bootstrap_admin: BootstrapAdmin,
    pub search: SearchConfig,
    pub reset_token_ttl: Duration,
    pub session_ttl: Duration,
}

pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let text = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let number = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match get(key) {
                Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                    name: key,
                    value: raw,
                }),
                None => Ok(default),
            }
        };

        let port = number("PORT", 3000)?;
        let port = u16::try_from(port).map_err(|_| ConfigError::InvalidNumber {
            name: "PORT",
            value: port.to_string(),
        })?;

        Ok(Self {
            host: text("HOST", "0.0.0.0"),
            port,
            snapshot_path: PathBuf::from(text("SNAPSHOT_PATH", "data/quiz.db")),
            snapshot_interval: Duration::from_secs(number("SNAPSHOT_INTERVAL_SECS", 30)?),
            bootstrap_admin: BootstrapAdmin {
                username: text("BOOTSTRAP_ADMIN_USERNAME", "admin"),
                email: text("BOOTSTRAP_ADMIN_EMAIL", "admin@localhost"),
                password: text("BOOTSTRAP_ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD),
            },
            search: SearchConfig {
                serper_api_key: get("SERPER_API_KEY"),
                serper_base_url: text("SERPER_BASE_URL", "https://google.serper.dev"),
                brave_api_key: get("BRAVE_API_KEY"),
                brave_base_url: text("BRAVE_BASE_URL", "https://api.search.brave.com"),
                timeout: Duration::from_secs(number("SEARCH_TIMEOUT_SECS", 10)?),
                cache_ttl: Duration::from_secs(number("SEARCH_CACHE_TTL_SECS", 3600)?),
            },
            reset_token_ttl: Duration::from_secs(number("RESET_TOKEN_TTL_MINS", 60)?.saturating_mul(60)),
            session_ttl: Duration::from_secs(number("SESSION_TTL_HOURS", 24)?.saturating_mul(3600)),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Milliseconds in `duration`, saturating at `i64::MAX`.
pub fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.snapshot_path, PathBuf::from("data/quiz.db"));
        assert_eq!(config.snapshot_interval, Duration::from_secs(30));
        assert_eq!(config.search.timeout, Duration::from_secs(10));
        assert_eq!(config.search.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.reset_token_ttl, Duration::from_secs(3600));
        assert_eq!(config.session_ttl, Duration::from_secs(86_400));
        assert!(config.search.serper_api_key.is_none());
        assert_eq!(config.bootstrap_admin.password, DEFAULT_ADMIN_PASSWORD);
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let config = Config::from_lookup(lookup(&[
            ("SERPER_API_KEY", "  "),
            ("BRAVE_API_KEY", "brave-key"),
        ]))
        .unwrap();
        assert!(config.search.serper_api_key.is_none());
        assert_eq!(config.search.brave_api_key.as_deref(), Some("brave-key"));
    }

    #[test]
    fn test_invalid_number_names_variable() {
        let err = Config::from_lookup(lookup(&[("SNAPSHOT_INTERVAL_SECS", "soon")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "SNAPSHOT_INTERVAL_SECS must be a non-negative integer, got 'soon'"
        );
    }

    #[test]
    fn test_port_out_of_range() {
        let err = Config::from_lookup(lookup(&[("PORT", "70000")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { name: "PORT", .. }));
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_secs(2)), 2_000);
        assert_eq!(millis(Duration::MAX), i64::MAX);
    }
}
