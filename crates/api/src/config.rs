//! Application configuration, read once at startup from the environment.

use std::net::SocketAddr;

use thiserror::Error;

use annostack_infra::EngineConfig;
use annostack_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error(transparent)]
    Engine(#[from] annostack_infra::ConfigError),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// Postgres connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub log_format: LogFormat,
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Configuration with the dev defaults and the given JWT secret.
    pub fn for_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 8080))),
            jwt_secret: jwt_secret.into(),
            database_url: None,
            log_format: LogFormat::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Read the configuration from the process environment.
    ///
    /// Unset keys keep their defaults; `JWT_SECRET` falls back to
    /// [`DEV_JWT_SECRET`], which [`AppConfig::uses_dev_secret`] reports.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEV_JWT_SECRET.to_string());
        let mut config = Self::for_secret(jwt_secret);

        if let Some(raw) = lookup("BIND_ADDR") {
            config.bind_addr = raw.parse().map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                message: format!("{raw:?}: {e}"),
            })?;
        }

        config.database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());

        if let Some(raw) = lookup("LOG_FORMAT") {
            config.log_format = raw.parse().map_err(|e: annostack_observability::UnknownLogFormat| {
                ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    message: e.to_string(),
                }
            })?;
        }

        config.engine = EngineConfig::from_lookup(&lookup)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use annostack_infra::ReversalPolicy;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_to_an_empty_environment() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert!(config.database_url.is_none());
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.engine.reversal_policy, ReversalPolicy::AllOrNothing);
    }

    #[test]
    fn reads_every_key() {
        let config = config(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://localhost/annostack"),
            ("LOG_FORMAT", "pretty"),
            ("REVERSAL_POLICY", "per_command"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/annostack"));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.engine.reversal_policy, ReversalPolicy::PerCommand);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            config(&[("BIND_ADDR", "nowhere")]),
            Err(ConfigError::Invalid { key: "BIND_ADDR", .. })
        ));
        assert!(matches!(
            config(&[("LOG_FORMAT", "xml")]),
            Err(ConfigError::Invalid { key: "LOG_FORMAT", .. })
        ));
        assert!(matches!(
            config(&[("REVERSAL_POLICY", "maybe")]),
            Err(ConfigError::Engine(_))
        ));
    }
}
