//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;

/// Deployment environment, which drives logging defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in seconds for `set` calls without explicit TTL
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Number of cache lock shards
    pub shard_count: usize,
    /// Entries visited per batch by pattern deletes
    pub scan_batch_size: usize,
    /// Entries examined per lock acquisition by the cleanup task
    pub sweep_batch_size: usize,
    /// Deployment environment
    pub environment: Environment,
    /// Explicit log level, overrides the environment default
    pub log_level: Option<String>,
    /// Directory for development log files
    pub log_dir: PathBuf,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `SHARD_COUNT` - Cache lock shards (default: 16)
    /// - `SCAN_BATCH_SIZE` - Pattern delete batch size (default: 100)
    /// - `SWEEP_BATCH_SIZE` - Cleanup batch size (default: 256)
    /// - `APP_ENV` - `production` selects production defaults; so does any `RENDER` value
    /// - `LOG_LEVEL` - Log level (default: `warn` in production, `info` otherwise)
    /// - `LOG_DIR` - Development log directory (default: `logs`)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let production = lookup("APP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production"))
            || lookup("RENDER").is_some();

        Self {
            default_ttl: parse_var(lookup("DEFAULT_TTL")).unwrap_or(defaults.default_ttl),
            server_port: parse_var(lookup("SERVER_PORT")).unwrap_or(defaults.server_port),
            cleanup_interval: parse_positive(lookup("CLEANUP_INTERVAL"))
                .unwrap_or(defaults.cleanup_interval),
            shard_count: parse_positive(lookup("SHARD_COUNT")).unwrap_or(defaults.shard_count),
            scan_batch_size: parse_positive(lookup("SCAN_BATCH_SIZE"))
                .unwrap_or(defaults.scan_batch_size),
            sweep_batch_size: parse_positive(lookup("SWEEP_BATCH_SIZE"))
                .unwrap_or(defaults.sweep_batch_size),
            environment: if production {
                Environment::Production
            } else {
                Environment::Development
            },
            log_level: lookup("LOG_LEVEL").filter(|v| !v.trim().is_empty()),
            log_dir: lookup("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
        }
    }

    /// Cache tuning derived from this configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::default()
            .with_default_ttl(Duration::from_secs(self.default_ttl))
            .with_shard_count(self.shard_count)
            .with_scan_batch_size(self.scan_batch_size)
            .with_sweep_batch_size(self.sweep_batch_size)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval.max(1))
    }
}

fn parse_var<T: FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|v| v.trim().parse().ok())
}

fn parse_positive<T>(raw: Option<String>) -> Option<T>
where
    T: FromStr + PartialOrd + Default,
{
    parse_var(raw).filter(|v: &T| *v > T::default())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: 3600,
            server_port: 3000,
            cleanup_interval: 1,
            shard_count: 16,
            scan_batch_size: 100,
            sweep_batch_size: 256,
            environment: Environment::Development,
            log_level: None,
            log_dir: PathBuf::from("logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_ttl, 3600);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 1);
        assert_eq!(config.scan_batch_size, 100);
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_config_from_empty_lookup_uses_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.default_ttl, 3600);
        assert_eq!(config.shard_count, 16);
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DEFAULT_TTL", "60"),
            ("SERVER_PORT", "8080"),
            ("SHARD_COUNT", "32"),
            ("SCAN_BATCH_SIZE", "25"),
            ("LOG_LEVEL", "debug"),
            ("LOG_DIR", "/tmp/cache-logs"),
        ]));

        assert_eq!(config.default_ttl, 60);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.shard_count, 32);
        assert_eq!(config.scan_batch_size, 25);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/cache-logs"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("SERVER_PORT", "not-a-port"),
            ("SHARD_COUNT", "0"),
            ("CLEANUP_INTERVAL", "0"),
            ("SCAN_BATCH_SIZE", "-3"),
        ]));

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.shard_count, 16);
        assert_eq!(config.cleanup_interval, 1);
        assert_eq!(config.scan_batch_size, 100);
    }

    #[test]
    fn test_production_detection() {
        let by_env = Config::from_lookup(lookup(&[("APP_ENV", "Production")]));
        assert!(by_env.environment.is_production());

        let by_host = Config::from_lookup(lookup(&[("RENDER", "true")]));
        assert!(by_host.environment.is_production());

        let dev = Config::from_lookup(lookup(&[("APP_ENV", "staging")]));
        assert!(!dev.environment.is_production());
    }

    #[test]
    fn test_cache_config() {
        let config = Config::from_lookup(lookup(&[("DEFAULT_TTL", "5")]));
        let cache = config.cache_config();
        assert_eq!(cache.default_ttl, Duration::from_secs(5));
        assert_eq!(cache.scan_batch_size, 100);
    }
}
