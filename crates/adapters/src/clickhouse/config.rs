// Copyright 2025 QueryBench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Connection settings for the ClickHouse gateway.
//!
//! The settings are plain data. Resolving them from files, the environment
//! or command-line flags is the caller's job; the gateway only receives the
//! final value.

use super::{ClickHouseError, Result};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Default HTTPS port of ClickHouse Cloud and secured servers.
pub const DEFAULT_PORT: u16 = 8443;

/// ClickHouse connection and measurement settings.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClickHouseConfig {
    /// Server host name (required).
    pub host: String,
    /// HTTP(S) port.
    pub port: u16,
    /// User name.
    pub user: String,
    /// Password.
    pub password: String,
    /// Default database for queries.
    pub database: String,
    /// Use HTTPS.
    pub secure: bool,
    /// Client-side timeout per HTTP request.
    pub query_timeout_secs: Option<u64>,
    /// Server-side `max_execution_time` per benchmark query.
    pub max_execution_time: Option<u64>,
    /// Drop the mark and uncompressed caches before every run.
    pub drop_caches: bool,
    /// Attempts to read a query's statistics from `system.query_log`.
    pub stats_attempts: u32,
    /// Base delay between query log attempts; attempt `n` waits `n` times this.
    pub stats_retry_delay_ms: u64,
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            user: "default".to_string(),
            password: String::new(),
            database: "default".to_string(),
            secure: true,
            query_timeout_secs: None,
            max_execution_time: None,
            drop_caches: true,
            stats_attempts: 3,
            stats_retry_delay_ms: 500,
        }
    }
}

impl fmt::Debug for ClickHouseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClickHouseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("secure", &self.secure)
            .field("query_timeout_secs", &self.query_timeout_secs)
            .field("max_execution_time", &self.max_execution_time)
            .field("drop_caches", &self.drop_caches)
            .field("stats_attempts", &self.stats_attempts)
            .field("stats_retry_delay_ms", &self.stats_retry_delay_ms)
            .finish()
    }
}

impl ClickHouseConfig {
    /// Create settings for `host` with all other values at their defaults.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Check that the settings can produce a usable client.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ClickHouseError::InvalidConfig(
                "ClickHouse host not provided. Set CLICKHOUSE_HOST or pass --host".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(ClickHouseError::InvalidConfig("port must be non-zero".to_string()));
        }
        if self.stats_attempts == 0 {
            return Err(ClickHouseError::InvalidConfig(
                "stats_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The HTTP endpoint, e.g. `https://host:8443/`.
    pub fn base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}:{}/", scheme, self.host.trim(), self.port)
    }

    /// Client-side request timeout, if configured.
    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_secs.map(Duration::from_secs)
    }

    /// Delay before query log attempt `attempt + 1`.
    pub fn stats_retry_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.stats_retry_delay_ms.saturating_mul(u64::from(attempt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClickHouseConfig::default();
        assert_eq!(config.port, 8443);
        assert_eq!(config.user, "default");
        assert_eq!(config.database, "default");
        assert!(config.secure);
        assert!(config.drop_caches);
        assert_eq!(config.stats_attempts, 3);
    }

    #[test]
    fn test_missing_host_is_invalid() {
        assert!(ClickHouseConfig::default().validate().is_err());
        assert!(ClickHouseConfig::new("  ").validate().is_err());
        assert!(ClickHouseConfig::new("ch.example.com").validate().is_ok());
    }

    #[test]
    fn test_base_url() {
        let mut config = ClickHouseConfig::new("ch.example.com");
        assert_eq!(config.base_url(), "https://ch.example.com:8443/");
        config.secure = false;
        config.port = 8123;
        assert_eq!(config.base_url(), "http://ch.example.com:8123/");
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: ClickHouseConfig =
            serde_json::from_str(r#"{"host": "localhost", "port": 8123, "secure": false}"#).unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8123);
        assert!(!config.secure);
        assert_eq!(config.user, "default");
        assert_eq!(config.stats_retry_delay(2), Duration::from_millis(1000));
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut config = ClickHouseConfig::new("localhost");
        config.password = "hunter2".to_string();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
