//! Application settings.
//!
//! Settings come from an optional TOML file (path in `CONFIG_PATH`, default
//! `config.toml`) and are then overridden by environment variables, which is how
//! deployments normally configure the service. Every field has a default except the
//! token secret.

use super::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Longest accepted bearer token lifetime (one year).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Runtime settings for the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `SeaORM` connection string
    pub database_url: String,
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// HMAC secret for bearer tokens
    pub jwt_secret: Option<String>,
    /// Bearer token lifetime
    pub token_ttl_hours: i64,
    /// Seconds between reminder job runs
    pub reminder_interval_secs: u64,
    /// Age after which sent/failed reminders are purged
    pub reminder_retention_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: "0.0.0.0:5000".to_string(),
            jwt_secret: None,
            token_ttl_hours: 24,
            reminder_interval_secs: 3600,
            reminder_retention_days: 180,
        }
    }
}

impl AppConfig {
    /// Applies overrides from a variable lookup (normally `std::env::var`).
    ///
    /// Unparseable numeric values are reported as configuration errors rather than
    /// silently ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.jwt_secret = Some(secret);
        }
        if let Some(value) = lookup("TOKEN_TTL_HOURS") {
            self.token_ttl_hours = parse_number("TOKEN_TTL_HOURS", &value)?;
        }
        if let Some(value) = lookup("REMINDER_INTERVAL_SECS") {
            self.reminder_interval_secs = parse_number("REMINDER_INTERVAL_SECS", &value)?;
        }
        if let Some(value) = lookup("REMINDER_RETENTION_DAYS") {
            self.reminder_retention_days = parse_number("REMINDER_RETENTION_DAYS", &value)?;
        }
        Ok(())
    }

    /// Checks numeric settings are in range.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for a zero reminder interval, a negative retention
    /// period, or a token lifetime outside `1..=MAX_TOKEN_TTL_HOURS`.
    pub fn validate(&self) -> Result<()> {
        if self.reminder_interval_secs == 0 {
            return Err(Error::Config {
                message: "REMINDER_INTERVAL_SECS must be at least 1".to_string(),
            });
        }
        if self.reminder_retention_days < 0 {
            return Err(Error::Config {
                message: format!(
                    "REMINDER_RETENTION_DAYS must not be negative, got {}",
                    self.reminder_retention_days
                ),
            });
        }
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&self.token_ttl_hours) {
            return Err(Error::Config {
                message: format!(
                    "TOKEN_TTL_HOURS must be between 1 and {MAX_TOKEN_TTL_HOURS}, got {}",
                    self.token_ttl_hours
                ),
            });
        }
        Ok(())
    }

    /// Returns the token secret, failing if none was configured.
    pub fn require_jwt_secret(&self) -> Result<&str> {
        self.jwt_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| Error::Config {
                message: "JWT_SECRET must be set".to_string(),
            })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| Error::Config {
        message: format!("{key} must be a number, got {value:?}"),
    })
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

/// Builds the runtime configuration: TOML file if present, then environment overrides.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let mut config = if Path::new(&path).exists() {
        info!("Loading configuration from {}", path);
        load_config(&path)?
    } else {
        debug!("No config file at {}, using defaults", path);
        AppConfig::default()
    };

    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_partial_config_uses_defaults() {
        let toml_str = r#"
            bind_addr = "127.0.0.1:8080"
            reminder_retention_days = 90
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.reminder_retention_days, 90);
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert!(config.jwt_secret.is_none());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "s3cret"),
            ("REMINDER_INTERVAL_SECS", "60"),
        ]);

        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.require_jwt_secret().unwrap(), "s3cret");
        assert_eq!(config.reminder_interval_secs, 60);
    }

    #[test]
    fn test_bad_number_is_config_error() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|key| {
            (key == "TOKEN_TTL_HOURS").then(|| "a day".to_string())
        });
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_out_of_range_numbers_are_config_errors() {
        let cases = [
            ("REMINDER_INTERVAL_SECS", "0"),
            ("REMINDER_RETENTION_DAYS", "-5"),
            ("TOKEN_TTL_HOURS", "-2"),
            ("TOKEN_TTL_HOURS", "0"),
            ("TOKEN_TTL_HOURS", "9223372036854775807"),
        ];

        for (name, value) in cases {
            let mut config = AppConfig::default();
            config
                .apply_overrides(|key| (key == name).then(|| value.to_string()))
                .unwrap();
            assert!(
                matches!(config.validate(), Err(Error::Config { .. })),
                "{name}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_defaults_and_edges_validate() {
        assert!(AppConfig::default().validate().is_ok());

        let config = AppConfig {
            reminder_interval_secs: 1,
            reminder_retention_days: 0,
            token_ttl_hours: MAX_TOKEN_TTL_HOURS,
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let config = AppConfig::default();
        assert!(matches!(
            config.require_jwt_secret(),
            Err(Error::Config { .. })
        ));
    }
}
