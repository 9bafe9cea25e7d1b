//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{AppConfig, ServiceLogConfig, API_URL_ENV_VAR, TOKEN_ENV_VAR};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    MissingEnv(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::MissingEnv(var) => {
                write!(f, "Environment variable {} not set", var)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

impl ServiceLogConfig {
    /// Build the credentials from `OCM_TOKEN` and `OCM_API_URL`.
    ///
    /// Only called at the process boundary; nothing below the binary reads
    /// the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_ENV_VAR).ok_or(ConfigError::MissingEnv(TOKEN_ENV_VAR))?;
        let api_url = lookup(API_URL_ENV_VAR).ok_or(ConfigError::MissingEnv(API_URL_ENV_VAR))?;

        Ok(Self {
            token,
            api_url,
            ..Self::default()
        })
    }
}

impl AppConfig {
    /// Override file-provided credentials with any set in the environment.
    pub fn apply_env(&mut self) {
        self.apply_lookup(|key| std::env::var(key).ok());
    }

    fn apply_lookup<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(TOKEN_ENV_VAR) {
            self.servicelog.token = token;
        }
        if let Some(api_url) = lookup(API_URL_ENV_VAR) {
            self.servicelog.api_url = api_url;
        }
    }
}
