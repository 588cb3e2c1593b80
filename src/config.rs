//! Runtime configuration read from the process environment
//!
//! Every setting is optional. `main` loads a `.env` file first (via dotenvy),
//! so values can live there during development.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::service::LinkOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Application settings
///
/// # Environment Variables
///
/// - `ENV_NAME` - Deployment label, only logged (default: "Local")
/// - `BASE_URL` - Public address used to build short and admin URLs (default: "http://localhost:8000")
/// - `HOST` - Interface to bind (default: "0.0.0.0")
/// - `PORT` - Server port number (default: 8000)
/// - `DATABASE_URL` - Path to database file (default: "shortener.db")
/// - `KEY_LENGTH` - Length of generated public keys (default: 5)
/// - `SECRET_KEY_LENGTH` - Length of generated secret keys (default: 8)
/// - `MAX_KEY_ATTEMPTS` - Generation attempts before giving up (default: 10)
/// - `PROBE_TIMEOUT_SECS` - Liveness probe timeout (default: 5)
/// - `SERVE_INACTIVE` - Whether deactivated links still redirect (default: true)
#[derive(Debug, Clone)]
pub struct Settings {
    pub env_name: String,
    pub base_url: Url,
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub key_length: usize,
    pub secret_key_length: usize,
    pub max_key_attempts: u32,
    pub probe_timeout: Duration,
    pub serve_inactive: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url_raw =
            lookup("BASE_URL").unwrap_or_else(|| "http://localhost:8000".to_string());
        let base_url = Url::parse(&base_url_raw).map_err(|err| ConfigError::Invalid {
            name: "BASE_URL",
            value: base_url_raw.clone(),
            reason: err.to_string(),
        })?;

        let settings = Self {
            env_name: lookup("ENV_NAME").unwrap_or_else(|| "Local".to_string()),
            base_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8000)?,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "shortener.db".to_string()),
            key_length: parse_or(&lookup, "KEY_LENGTH", 5)?,
            secret_key_length: parse_or(&lookup, "SECRET_KEY_LENGTH", 8)?,
            max_key_attempts: parse_or(&lookup, "MAX_KEY_ATTEMPTS", 10)?,
            probe_timeout: Duration::from_secs(parse_or(&lookup, "PROBE_TIMEOUT_SECS", 5)?),
            serve_inactive: parse_or(&lookup, "SERVE_INACTIVE", true)?,
        };

        positive("KEY_LENGTH", settings.key_length)?;
        positive("SECRET_KEY_LENGTH", settings.secret_key_length)?;
        positive("MAX_KEY_ATTEMPTS", settings.max_key_attempts as usize)?;
        positive("PROBE_TIMEOUT_SECS", settings.probe_timeout.as_secs() as usize)?;

        Ok(settings)
    }

    pub fn link_options(&self) -> LinkOptions {
        LinkOptions {
            key_length: self.key_length,
            secret_key_length: self.secret_key_length,
            max_key_attempts: self.max_key_attempts,
            serve_inactive: self.serve_inactive,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|err| ConfigError::Invalid {
                name,
                reason: err.to_string(),
                value,
            })
        }
        None => Ok(default),
    }
}

fn positive(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings_from(&[]).unwrap();
        assert_eq!(settings.env_name, "Local");
        assert_eq!(settings.base_url.as_str(), "http://localhost:8000/");
        assert_eq!(settings.bind_addr(), "0.0.0.0:8000");
        assert_eq!(settings.database_url, "shortener.db");
        assert_eq!(settings.key_length, 5);
        assert_eq!(settings.secret_key_length, 8);
        assert_eq!(settings.max_key_attempts, 10);
        assert_eq!(settings.probe_timeout, Duration::from_secs(5));
        assert!(settings.serve_inactive);
    }

    #[test]
    fn test_overrides() {
        let settings = settings_from(&[
            ("BASE_URL", "https://sho.rt"),
            ("PORT", "9090"),
            ("KEY_LENGTH", "7"),
            ("SERVE_INACTIVE", "false"),
        ])
        .unwrap();
        assert_eq!(settings.base_url.host_str(), Some("sho.rt"));
        assert_eq!(settings.port, 9090);
        assert_eq!(settings.link_options().key_length, 7);
        assert!(!settings.link_options().serve_inactive);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(settings_from(&[("PORT", "eighty")]).is_err());
        assert!(settings_from(&[("BASE_URL", "not a url")]).is_err());
        assert!(settings_from(&[("KEY_LENGTH", "0")]).is_err());
        assert!(settings_from(&[("SERVE_INACTIVE", "maybe")]).is_err());
    }
}
