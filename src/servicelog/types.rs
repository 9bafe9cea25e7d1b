//! Log entry types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cluster::ClusterId;

/// Correlation identifier tagging every entry of one upgrade attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EventId(pub String);

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of a single cluster log submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub cluster_uuid: String,
    pub internal_only: bool,
    pub description: String,
    pub service_name: String,
    pub summary: String,
}

impl LogEntry {
    /// Build an internal-only entry, prefixing the summary with the event ID.
    pub fn new(
        cluster_id: &ClusterId,
        service_name: &str,
        event_id: &EventId,
        summary: &str,
        description: &str,
    ) -> Self {
        Self {
            cluster_uuid: cluster_id.to_string(),
            internal_only: true,
            description: description.to_string(),
            service_name: service_name.to_string(),
            summary: format_summary(event_id, summary),
        }
    }
}

/// Summary line as it appears in the service log.
pub fn format_summary(event_id: &EventId, summary: &str) -> String {
    format!("Event #{} - {}", event_id, summary)
}

/// Errors that can occur while resolving, connecting or submitting.
#[derive(Debug, Error)]
pub enum ServiceLogError {
    /// Cluster version lookup failed or returned nothing.
    #[error("Unable to resolve cluster identity: {0}")]
    IdentityResolution(String),

    /// The per-call connection could not be built.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The request failed in transport.
    #[error("Unable to create service log: {0}")]
    Submission(String),

    /// The service answered with something other than 201 Created.
    #[error("Unable to create service log: unexpected status {status}")]
    UnexpectedStatus { status: u16 },

    /// The reporter handed to the decorator is not counter-backed.
    #[error("Unexpected metrics type: {0}")]
    UnsupportedReporter(String),
}

impl ServiceLogError {
    /// True when the remote call was made but did not create an entry.
    pub fn is_submission_failure(&self) -> bool {
        matches!(
            self,
            ServiceLogError::Submission(_) | ServiceLogError::UnexpectedStatus { .. }
        )
    }
}

/// Result type for service log operations.
pub type ServiceLogResult<T> = Result<T, ServiceLogError>;
