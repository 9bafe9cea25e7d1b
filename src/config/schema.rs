//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Credentials are normally supplied through the environment at process
//! startup and then carried explicitly from here on.

use serde::{Deserialize, Serialize};

/// Environment variable holding the service log access token.
pub const TOKEN_ENV_VAR: &str = "OCM_TOKEN";

/// Environment variable holding the service log API base URL.
pub const API_URL_ENV_VAR: &str = "OCM_API_URL";

/// Root configuration for the service log tooling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Service name attached to every log entry.
    pub service_name: String,

    /// Remote log service settings.
    pub servicelog: ServiceLogConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "managed-upgrade-operator".to_string(),
            servicelog: ServiceLogConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Remote log service configuration.
///
/// Neither the token nor the URL is validated locally. Bad values surface
/// as connection or submission failures on the first `create_log`.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceLogConfig {
    /// Bearer token used to authenticate against the API.
    pub token: String,

    /// Base API URL (e.g., "https://api.openshift.com").
    pub api_url: String,

    /// Request timeout for a single submission in seconds.
    pub timeout_secs: u64,
}

impl Default for ServiceLogConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: String::new(),
            timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for ServiceLogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceLogConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
