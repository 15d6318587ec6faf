//! Runtime configuration for repositories and the saga processor.
//!
//! Configuration is plain serde data. Every field has a default, so a
//! partial JSON document or an empty environment yields a usable config.
//!
//! # Environment variables
//!
//! - `SAGA_OPTIMISTIC_CONCURRENCY`: `true`/`false`
//! - `SAGA_KEY_PREFIX`: namespace for stored keys
//! - `SAGA_MAX_CONFLICT_RETRIES`: retries after a concurrency conflict
//! - `SAGA_REMOVE_COMPLETED`: `true`/`false`, remove instances once Final

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value '{value}' for {variable}")]
    InvalidEnv { variable: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SagaConfig {
    pub repository: RepositoryConfig,
    pub processor: ProcessorConfig,
}

/// Options for saga repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Reject saves whose expected version is stale. When disabled every
    /// save succeeds and the caller must serialize access per saga.
    pub optimistic_concurrency: bool,

    /// Prepended to correlation ids as `prefix:id`.
    pub key_prefix: Option<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            optimistic_concurrency: true,
            key_prefix: None,
        }
    }
}

/// Options for the load, raise, save cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Additional attempts after the first save conflicts.
    pub max_conflict_retries: u32,

    /// Delete instances from the repository once they reach Final.
    pub remove_completed: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: 3,
            remove_completed: true,
        }
    }
}

impl SagaConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by any `SAGA_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = parse_var("SAGA_OPTIMISTIC_CONCURRENCY")? {
            config.repository.optimistic_concurrency = value;
        }
        if let Ok(prefix) = env::var("SAGA_KEY_PREFIX") {
            config.repository.key_prefix = Some(prefix);
        }
        if let Some(value) = parse_var("SAGA_MAX_CONFLICT_RETRIES")? {
            config.processor.max_conflict_retries = value;
        }
        if let Some(value) = parse_var("SAGA_REMOVE_COMPLETED")? {
            config.processor.remove_completed = value;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(prefix) = &self.repository.key_prefix {
            if prefix.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "repository.key_prefix must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(variable: &str) -> Result<Option<T>, ConfigError> {
    match env::var(variable) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                variable: variable.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}
