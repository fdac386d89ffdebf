use std::env;
use std::time::Duration;

use chrono_tz::Tz;
use thiserror::Error;

use crate::domain::checkin::DEFAULT_TIMEZONE;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhonePeEnvironment {
    Sandbox,
    Production,
}

impl PhonePeEnvironment {
    pub fn auth_base_url(&self) -> &'static str {
        match self {
            PhonePeEnvironment::Sandbox => "https://api-preprod.phonepe.com/apis/pg-sandbox",
            PhonePeEnvironment::Production => "https://api.phonepe.com/apis/identity-manager",
        }
    }

    pub fn checkout_base_url(&self) -> &'static str {
        match self {
            PhonePeEnvironment::Sandbox => "https://api-preprod.phonepe.com/apis/pg-sandbox",
            PhonePeEnvironment::Production => "https://api.phonepe.com/apis/pg",
        }
    }
}

/// Credentials and endpoints for the PhonePe standard checkout.
#[derive(Debug, Clone)]
pub struct PhonePeConfig {
    pub client_id: String,
    pub client_secret: String,
    pub client_version: String,
    pub environment: PhonePeEnvironment,
    /// Shared with PhonePe to authenticate callbacks.
    pub callback_username: String,
    pub callback_password: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_pool_size: u32,
    pub checkin_timezone: Tz,
    /// Where the gateway sends the payer after checkout.
    pub payment_redirect_url: String,
    pub phonepe: PhonePeConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let or_default = |name: &str, default: &str| {
            lookup(name).unwrap_or_else(|| default.to_string())
        };

        let port = parse("PORT", &or_default("PORT", "8080"))?;
        let db_pool_size: u32 = parse("DB_POOL_SIZE", &or_default("DB_POOL_SIZE", "10"))?;
        if db_pool_size == 0 {
            return Err(ConfigError::Invalid {
                name: "DB_POOL_SIZE",
                reason: "must be at least 1".to_string(),
            });
        }

        let checkin_timezone = match lookup("CHECKIN_TIMEZONE") {
            Some(raw) => raw.parse::<Tz>().map_err(|e| ConfigError::Invalid {
                name: "CHECKIN_TIMEZONE",
                reason: e.to_string(),
            })?,
            None => DEFAULT_TIMEZONE,
        };

        let environment = match or_default("PHONEPE_ENV", "sandbox").to_ascii_lowercase().as_str() {
            "sandbox" | "uat" => PhonePeEnvironment::Sandbox,
            "production" | "prod" => PhonePeEnvironment::Production,
            other => {
                return Err(ConfigError::Invalid {
                    name: "PHONEPE_ENV",
                    reason: format!("expected sandbox or production, got '{other}'"),
                })
            }
        };
        let timeout_secs: u64 = parse(
            "PHONEPE_TIMEOUT_SECS",
            &or_default("PHONEPE_TIMEOUT_SECS", "15"),
        )?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: or_default("HOST", "0.0.0.0"),
            port,
            db_pool_size,
            checkin_timezone,
            payment_redirect_url: required("PAYMENT_REDIRECT_URL")?,
            phonepe: PhonePeConfig {
                client_id: required("PHONEPE_CLIENT_ID")?,
                client_secret: required("PHONEPE_CLIENT_SECRET")?,
                client_version: or_default("PHONEPE_CLIENT_VERSION", "1"),
                environment,
                callback_username: required("PHONEPE_CALLBACK_USERNAME")?,
                callback_password: required("PHONEPE_CALLBACK_PASSWORD")?,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn parse<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn base() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DATABASE_URL", "postgres://localhost/tickets"),
            ("PAYMENT_REDIRECT_URL", "https://tickets.example.com/paid"),
            ("PHONEPE_CLIENT_ID", "client"),
            ("PHONEPE_CLIENT_SECRET", "secret"),
            ("PHONEPE_CALLBACK_USERNAME", "hook"),
            ("PHONEPE_CALLBACK_PASSWORD", "hook-pass"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_absent() {
        let config = load(&base()).expect("config should load");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_pool_size, 10);
        assert_eq!(config.checkin_timezone, chrono_tz::Asia::Kolkata);
        assert_eq!(config.phonepe.environment, PhonePeEnvironment::Sandbox);
        assert_eq!(config.phonepe.client_version, "1");
        assert_eq!(config.phonepe.timeout, Duration::from_secs(15));
    }

    #[test]
    fn missing_database_url_is_reported() {
        let mut vars = base();
        vars.remove("DATABASE_URL");
        assert_eq!(load(&vars).unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn bad_port_is_invalid() {
        let mut vars = base();
        vars.insert("PORT", "eighty");
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::Invalid { name: "PORT", .. }
        ));
    }

    #[test]
    fn unknown_timezone_is_invalid() {
        let mut vars = base();
        vars.insert("CHECKIN_TIMEZONE", "Mars/Olympus");
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::Invalid { name: "CHECKIN_TIMEZONE", .. }
        ));
    }

    #[test]
    fn production_environment_switches_hosts() {
        let mut vars = base();
        vars.insert("PHONEPE_ENV", "production");
        vars.insert("CHECKIN_TIMEZONE", "Asia/Dubai");
        let config = load(&vars).expect("config should load");
        assert_eq!(config.phonepe.environment, PhonePeEnvironment::Production);
        assert_eq!(
            config.phonepe.environment.checkout_base_url(),
            "https://api.phonepe.com/apis/pg"
        );
        assert_eq!(config.checkin_timezone, chrono_tz::Asia::Dubai);
    }
}
