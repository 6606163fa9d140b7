//! Configuration for the bridge binary.
//!
//! All configuration is loaded from environment variables, each with a
//! default, so the bridge starts with no configuration at all against a
//! local Redis on port 6379.

use std::time::Duration;

use feedline_core::SessionConfig;
use feedline_server::ServerConfig;
use feedline_store::RedisSettings;
use feedline_types::{DEFAULT_STREAM, TEST_STREAM};

use crate::error::BridgeError;

/// Complete bridge configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Listen address.
    pub server: ServerConfig,
    /// Backing store connection.
    pub redis: RedisSettings,
    /// Parameters applied to every session.
    pub session: SessionConfig,
    /// Stream rendered by the demo page.
    pub test_stream: String,
}

impl BridgeConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional variables:
    /// - `BRIDGE_ADDR` -- listen address, `host:port` or `:port` (default `:8080`)
    /// - `REDIS_URL` -- store URL (default `redis://localhost:6379/0`)
    /// - `REDIS_POOL_SIZE` -- pooled connections (default 4)
    /// - `REDIS_MAX_RETRIES` -- attempts per command (default 10)
    /// - `REDIS_MIN_BACKOFF_MS` -- first reconnect delay (default 8)
    /// - `REDIS_MAX_BACKOFF_MS` -- reconnect delay cap (default 5000)
    /// - `POLL_PERIOD_MS` -- tick interval and read block (default 100)
    /// - `WRITE_WAIT_MS` -- per-frame write deadline (default 10000)
    /// - `READ_COUNT` -- cap on entries per read (default unbounded)
    /// - `DEFAULT_STREAM` -- stream when the client names none (default `default_stream`)
    /// - `TEST_STREAM` -- stream shown by `/test` (default `test_stream`)
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if a variable is set but cannot be
    /// parsed.
    pub fn from_env() -> Result<Self, BridgeError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BridgeError> {
        let server = parse_addr(&lookup("BRIDGE_ADDR").unwrap_or_else(|| ":8080".to_owned()))?;

        let redis_defaults = RedisSettings::default();
        let redis = RedisSettings {
            url: lookup("REDIS_URL").unwrap_or(redis_defaults.url),
            pool_size: parse_or(&lookup, "REDIS_POOL_SIZE", redis_defaults.pool_size)?,
            max_retries: parse_or(&lookup, "REDIS_MAX_RETRIES", redis_defaults.max_retries)?,
            min_backoff: millis_or(&lookup, "REDIS_MIN_BACKOFF_MS", redis_defaults.min_backoff)?,
            max_backoff: millis_or(&lookup, "REDIS_MAX_BACKOFF_MS", redis_defaults.max_backoff)?,
        };

        let session_defaults = SessionConfig::default();
        let read_count = match lookup("READ_COUNT") {
            Some(raw) => Some(
                raw.trim()
                    .parse()
                    .map_err(|e| BridgeError::Config(format!("invalid READ_COUNT: {e}")))?,
            ),
            None => None,
        };
        let session = SessionConfig {
            poll_period: millis_or(&lookup, "POLL_PERIOD_MS", session_defaults.poll_period)?,
            write_wait: millis_or(&lookup, "WRITE_WAIT_MS", session_defaults.write_wait)?,
            read_count,
            default_stream: lookup("DEFAULT_STREAM").unwrap_or_else(|| DEFAULT_STREAM.to_owned()),
        };

        let test_stream = lookup("TEST_STREAM").unwrap_or_else(|| TEST_STREAM.to_owned());

        Ok(Self {
            server,
            redis,
            session,
            test_stream,
        })
    }
}

/// Parse a listen address. An empty host (`:8080`) means all interfaces.
fn parse_addr(raw: &str) -> Result<ServerConfig, BridgeError> {
    let (host, port) = raw
        .trim()
        .rsplit_once(':')
        .ok_or_else(|| BridgeError::Config(format!("invalid BRIDGE_ADDR {raw:?}: missing port")))?;
    let port = port
        .parse()
        .map_err(|e| BridgeError::Config(format!("invalid BRIDGE_ADDR port {port:?}: {e}")))?;
    let host = match host.trim_start_matches('[').trim_end_matches(']') {
        "" => "0.0.0.0",
        other => other,
    };
    Ok(ServerConfig {
        host: host.to_owned(),
        port,
    })
}

/// Read an optional numeric variable, falling back to `default`.
fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, BridgeError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e| BridgeError::Config(format!("invalid {name}: {e}")))
    })
}

/// Read an optional millisecond duration, falling back to `default`.
fn millis_or(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: Duration,
) -> Result<Duration, BridgeError> {
    match lookup(name) {
        Some(_) => parse_or(lookup, name, 0_u64).map(Duration::from_millis),
        None => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<BridgeConfig, BridgeError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        BridgeConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.redis, RedisSettings::default());
        assert_eq!(config.session, SessionConfig::default());
        assert_eq!(config.test_stream, "test_stream");
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("BRIDGE_ADDR", "127.0.0.1:9000"),
            ("REDIS_URL", "redis://cache:6380/2"),
            ("REDIS_POOL_SIZE", "16"),
            ("POLL_PERIOD_MS", "250"),
            ("WRITE_WAIT_MS", "500"),
            ("READ_COUNT", "50"),
            ("DEFAULT_STREAM", "events"),
            ("TEST_STREAM", "demo"),
        ])
        .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.redis.url, "redis://cache:6380/2");
        assert_eq!(config.redis.pool_size, 16);
        assert_eq!(config.session.poll_period, Duration::from_millis(250));
        assert_eq!(config.session.write_wait, Duration::from_millis(500));
        assert_eq!(config.session.read_count, Some(50));
        assert_eq!(config.session.default_stream, "events");
        assert_eq!(config.test_stream, "demo");
    }

    #[test]
    fn port_only_address_binds_all_interfaces() {
        let server = parse_addr(":7000").unwrap();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 7000);

        let v6 = parse_addr("[::1]:7001").unwrap();
        assert_eq!(v6.host, "::1");
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(load(&[("BRIDGE_ADDR", "8080")]), Err(BridgeError::Config(_))));
        assert!(matches!(load(&[("BRIDGE_ADDR", ":http")]), Err(BridgeError::Config(_))));
        assert!(matches!(load(&[("POLL_PERIOD_MS", "fast")]), Err(BridgeError::Config(_))));
        assert!(matches!(load(&[("READ_COUNT", "-1")]), Err(BridgeError::Config(_))));
    }
}
