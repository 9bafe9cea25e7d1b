//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)                 environment (OCM_TOKEN, OCM_API_URL)
//!     → loader.rs (parse)                → loader.rs (read once at startup)
//!             \                          /
//!              → AppConfig (immutable) ←
//!                    → ServiceLogConfig passed into ServiceLogClient
//! ```
//!
//! # Design Decisions
//! - The environment is read only at the process boundary
//! - All fields have defaults to allow minimal configs
//! - Credentials are not validated locally

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError};
pub use schema::AppConfig;
pub use schema::ObservabilityConfig;
pub use schema::ServiceLogConfig;
