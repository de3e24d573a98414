//! Process configuration read from the environment.

use std::time::Duration;

use thiserror::Error;

use stayhub_infra::PostgresStoreOptions;

pub const DEFAULT_PORT: u16 = 5000;
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnvironment {
    #[default]
    Development,
    Production,
}

impl AppEnvironment {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(AppEnvironment::Development),
            "production" | "prod" => Some(AppEnvironment::Production),
            _ => None,
        }
    }

    /// Development responses carry error details in a `stack` field.
    pub fn is_development(self) -> bool {
        matches!(self, AppEnvironment::Development)
    }
}

#[derive(Debug, Clone)]
pub enum StorageConfig {
    InMemory,
    Postgres {
        database_url: String,
        options: PostgresStoreOptions,
    },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub jwt_secret: String,
    pub environment: AppEnvironment,
    pub storage: StorageConfig,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not valid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("{0} must be set when USE_PERSISTENT_STORES is enabled")]
    Missing(&'static str),
}

impl ApiConfig {
    /// Development defaults with in-memory storage.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            port: DEFAULT_PORT,
            jwt_secret: jwt_secret.into(),
            environment: AppEnvironment::Development,
            storage: StorageConfig::InMemory,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => parse_number("PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let environment = match get("APP_ENV") {
            Some(raw) => AppEnvironment::parse(&raw).ok_or_else(|| ConfigError::Invalid {
                var: "APP_ENV",
                reason: format!("expected development or production, got '{raw}'"),
            })?,
            None => AppEnvironment::default(),
        };

        let persistent = match get("USE_PERSISTENT_STORES") {
            Some(raw) => parse_flag("USE_PERSISTENT_STORES", &raw)?,
            None => false,
        };

        let storage = if persistent {
            let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let mut options = PostgresStoreOptions::default();
            if let Some(raw) = get("DATABASE_MAX_CONNECTIONS") {
                options.max_connections = parse_number("DATABASE_MAX_CONNECTIONS", &raw)?;
            }
            if let Some(raw) = get("DATABASE_ACQUIRE_TIMEOUT_SECS") {
                options.acquire_timeout =
                    Duration::from_secs(parse_number("DATABASE_ACQUIRE_TIMEOUT_SECS", &raw)?);
            }
            StorageConfig::Postgres { database_url, options }
        } else {
            StorageConfig::InMemory
        };

        Ok(Self {
            port,
            jwt_secret,
            environment,
            storage,
        })
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            var,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_to_in_memory_development_on_port_5000() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.environment, AppEnvironment::Development);
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert!(matches!(cfg.storage, StorageConfig::InMemory));
    }

    #[test]
    fn persistent_stores_need_a_database_url() {
        let err = config(&[("USE_PERSISTENT_STORES", "true")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));

        let cfg = config(&[
            ("USE_PERSISTENT_STORES", "1"),
            ("DATABASE_URL", "postgres://localhost/stayhub"),
            ("DATABASE_MAX_CONNECTIONS", "3"),
            ("DATABASE_ACQUIRE_TIMEOUT_SECS", "2"),
        ])
        .unwrap();
        match cfg.storage {
            StorageConfig::Postgres { database_url, options } => {
                assert_eq!(database_url, "postgres://localhost/stayhub");
                assert_eq!(options.max_connections, 3);
                assert_eq!(options.acquire_timeout, Duration::from_secs(2));
            }
            StorageConfig::InMemory => panic!("expected postgres storage"),
        }
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(matches!(
            config(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { var: "PORT", .. })
        ));
        assert!(matches!(
            config(&[("APP_ENV", "staging")]),
            Err(ConfigError::Invalid { var: "APP_ENV", .. })
        ));
        assert!(matches!(
            config(&[("USE_PERSISTENT_STORES", "maybe")]),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn production_is_recognized() {
        let cfg = config(&[("APP_ENV", "production"), ("PORT", "8080")]).unwrap();
        assert_eq!(cfg.environment, AppEnvironment::Production);
        assert!(!cfg.environment.is_development());
        assert_eq!(cfg.port, 8080);
    }
}
