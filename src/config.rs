//! Configuration management for the MLflow tracking client.
//!
//! This module handles loading and validating configuration from environment
//! variables, following the conventions of the MLflow CLI (`MLFLOW_*` vars).

use crate::error::{ConfigError, ConfigResult};
use std::env;

/// Configuration for the MLflow tracking client.
#[derive(Debug, Clone)]
pub struct Config {
    /// MLflow tracking server base URL
    pub tracking_uri: String,

    /// Experiment that runs are created under (default: "Default")
    pub experiment_name: String,

    /// Optional bearer token for authenticated tracking servers
    pub tracking_token: Option<String>,

    /// Whether tracking calls are forwarded at all (default: true)
    pub tracking_active: bool,

    /// HTTP request timeout in seconds (default: 10)
    pub request_timeout: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `MLFLOW_TRACKING_URI`: Base URL of the tracking server
    ///
    /// Optional environment variables:
    /// - `MLFLOW_EXPERIMENT_NAME`: Experiment name (default: "Default")
    /// - `MLFLOW_TRACKING_TOKEN`: Bearer token for authentication
    /// - `MLFLOW_TRACKING_ACTIVE`: Whether tracking is active (default: true)
    /// - `REQUEST_TIMEOUT`: HTTP timeout in seconds (default: 10)
    pub fn from_env() -> ConfigResult<Self> {
        // Try to load .env file if it exists (but don't fail if it doesn't)
        let _ = dotenvy::dotenv();

        let tracking_uri = env::var("MLFLOW_TRACKING_URI")
            .map_err(|_| ConfigError::MissingVar("MLFLOW_TRACKING_URI".to_string()))?;

        // Validate tracking URI format
        if !tracking_uri.starts_with("http://") && !tracking_uri.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: "MLFLOW_TRACKING_URI".to_string(),
                reason: "Must start with http:// or https://".to_string(),
            });
        }

        let experiment_name =
            env::var("MLFLOW_EXPERIMENT_NAME").unwrap_or_else(|_| "Default".to_string());
        if experiment_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                var: "MLFLOW_EXPERIMENT_NAME".to_string(),
                reason: "Cannot be empty".to_string(),
            });
        }

        let tracking_token = match env::var("MLFLOW_TRACKING_TOKEN") {
            Ok(token) if token.trim().is_empty() => {
                return Err(ConfigError::InvalidValue {
                    var: "MLFLOW_TRACKING_TOKEN".to_string(),
                    reason: "Cannot be empty when set".to_string(),
                });
            }
            Ok(token) => Some(token),
            Err(_) => None,
        };

        let tracking_active = Self::parse_env_bool("MLFLOW_TRACKING_ACTIVE", true)?;
        let request_timeout = Self::parse_env_u64("REQUEST_TIMEOUT", 10)?;

        Ok(Config {
            tracking_uri,
            experiment_name,
            tracking_token,
            tracking_active,
            request_timeout,
        })
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }

    /// Parse an environment variable as bool with a default value.
    fn parse_env_bool(var_name: &str, default: bool) -> ConfigResult<bool> {
        match env::var(var_name) {
            Ok(val) => match val.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    var: var_name.to_string(),
                    reason: format!("Must be true/false/1/0, got: {}", val),
                }),
            },
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tracking_uri: String::new(),
            experiment_name: "Default".to_string(),
            tracking_token: None,
            tracking_active: true,
            request_timeout: 10,
        }
    }
}
