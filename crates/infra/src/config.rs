//! Engine configuration, read from the process environment.

use thiserror::Error;

use crate::undo::ReversalPolicy;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Settings of the command engine itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// How a multi-command undo/redo behaves when one reversal fails.
    pub reversal_policy: ReversalPolicy,
    /// Pool size for the Postgres store.
    pub max_connections: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reversal_policy: ReversalPolicy::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl EngineConfig {
    /// Read `REVERSAL_POLICY` and `DATABASE_MAX_CONNECTIONS`; unset keys keep
    /// their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("REVERSAL_POLICY") {
            config.reversal_policy = raw.parse().map_err(|message| ConfigError::Invalid {
                key: "REVERSAL_POLICY",
                message,
            })?;
        }

        if let Some(raw) = lookup("DATABASE_MAX_CONNECTIONS") {
            config.max_connections = match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "DATABASE_MAX_CONNECTIONS",
                        message: format!("expected a positive integer, got {raw:?}"),
                    });
                }
            };
        }

        Ok(config)
    }
}
