//! Service log subsystem.
//!
//! # Data Flow
//! ```text
//! ClusterVersionLister (once, at construction)
//!     → client.rs (cluster ID, service name, current event ID)
//!     → types.rs (LogEntry with "Event #<id> - <summary>")
//!     → POST {api_url}/api/service_logs/v1/cluster_logs
//!     → 201 Created, or ServiceLogError
//! ```
//!
//! # Security Constraints
//! - The token is only sent as a bearer header and never logged
//! - Every entry is flagged internal-only

pub mod client;
pub mod types;

pub use client::{ServiceLogClient, ServiceLogger};
pub use types::{EventId, LogEntry, ServiceLogError, ServiceLogResult};
