//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Default webhook port when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 8000;

/// Viewer poll interval bounds, in seconds.
pub const MIN_POLL_SECS: u64 = 5;
pub const MAX_POLL_SECS: u64 = 60;
const DEFAULT_POLL_SECS: u64 = 10;

/// Responder configuration.
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    /// TCP port the webhook server binds to.
    pub port: u16,
    /// Path to the exchange log database file.
    pub db_path: String,
    /// How often the viewer re-reads the log.
    pub poll_interval: Duration,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            db_path: "./data/sampark.db".to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
        }
    }
}

impl ResponderConfig {
    /// Build configuration from environment variables.
    ///
    /// - `PORT` — webhook port (default 8000)
    /// - `SAMPARK_DB_PATH` — database file (default `./data/sampark.db`)
    /// - `SAMPARK_POLL_INTERVAL_SECS` — viewer interval, clamped to 5–60
    ///
    /// Unset variables fall back to defaults; set-but-invalid values are a
    /// configuration error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_port(std::env::var("PORT").ok().as_deref())?;

        let db_path = std::env::var("SAMPARK_DB_PATH")
            .unwrap_or_else(|_| "./data/sampark.db".to_string());

        let poll_secs =
            parse_poll_secs(std::env::var("SAMPARK_POLL_INTERVAL_SECS").ok().as_deref())?;

        Ok(Self {
            port,
            db_path,
            poll_interval: Duration::from_secs(poll_secs),
        })
    }
}

/// Parse the webhook port, defaulting when unset.
fn parse_port(raw: Option<&str>) -> Result<u16, ConfigError> {
    match raw {
        None => Ok(DEFAULT_PORT),
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: "PORT".to_string(),
            message: format!("not a valid port: {raw}"),
        }),
    }
}

/// Parse the poll interval, defaulting when unset and clamping into range.
fn parse_poll_secs(raw: Option<&str>) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(DEFAULT_POLL_SECS),
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "SAMPARK_POLL_INTERVAL_SECS".to_string(),
                message: format!("not a number of seconds: {raw}"),
            })
            .map(|secs| secs.clamp(MIN_POLL_SECS, MAX_POLL_SECS)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ResponderConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.poll_interval, Duration::from_secs(10));
    }

    #[test]
    fn port_unset_uses_default() {
        assert_eq!(parse_port(None).unwrap(), DEFAULT_PORT);
    }

    #[test]
    fn port_invalid_is_an_error() {
        assert!(matches!(
            parse_port(Some("not-a-port")),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn poll_interval_unset_uses_default() {
        assert_eq!(parse_poll_secs(None).unwrap(), 10);
    }

    #[test]
    fn poll_interval_clamped_low() {
        assert_eq!(parse_poll_secs(Some("1")).unwrap(), MIN_POLL_SECS);
    }

    #[test]
    fn poll_interval_clamped_high() {
        assert_eq!(parse_poll_secs(Some("3600")).unwrap(), MAX_POLL_SECS);
    }

    #[test]
    fn poll_interval_in_range_kept() {
        assert_eq!(parse_poll_secs(Some("30")).unwrap(), 30);
    }

    #[test]
    fn poll_interval_invalid_is_an_error() {
        assert!(matches!(
            parse_poll_secs(Some("soon")),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
