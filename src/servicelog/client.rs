//! Service log client.
//!
//! # Responsibilities
//! - Resolve the cluster identity once, at construction
//! - Hold the current upgrade event ID
//! - Submit one internal-only entry per `create_log` call
//!
//! Each call opens its own connection and drops it before returning, on
//! success and on error alike. There is no retry and no buffering: the
//! returned future resolves only after the remote service has answered.

use arc_swap::ArcSwap;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::cluster::{ClusterId, ClusterVersionLister};
use crate::config::ServiceLogConfig;
use crate::reporter::audit::AuditedMetrics;
use crate::reporter::UpgradeMetrics;
use crate::servicelog::types::{EventId, LogEntry, ServiceLogError, ServiceLogResult};

/// Path of the cluster logs collection, relative to the API base URL.
pub const CLUSTER_LOGS_PATH: &str = "/api/service_logs/v1/cluster_logs";

/// Log creation capability used by the metrics decorator.
#[async_trait]
pub trait ServiceLogger: Send + Sync {
    /// Create one log entry tagged with the current event ID.
    async fn create_log(&self, summary: &str, description: &str) -> ServiceLogResult<()>;

    /// Replace the event ID used by subsequent `create_log` calls.
    fn set_upgrade_event_id(&self, id: EventId);
}

/// Client for the remote service log API, scoped to one cluster.
pub struct ServiceLogClient {
    config: ServiceLogConfig,
    cluster_id: ClusterId,
    service_name: String,
    event_id: ArcSwap<EventId>,
}

impl ServiceLogClient {
    /// Create a new service log client.
    ///
    /// # Arguments
    /// * `lister` - Source of cluster version resources
    /// * `service_name` - Constant service name stamped on every entry
    /// * `config` - Token and API URL, taken as given
    ///
    /// # Returns
    /// A client bound to the first cluster version's ID, or
    /// `IdentityResolution` if the listing fails or is empty.
    pub async fn new(
        lister: &dyn ClusterVersionLister,
        service_name: &str,
        config: ServiceLogConfig,
    ) -> ServiceLogResult<Self> {
        let versions = lister
            .list_cluster_versions()
            .await
            .map_err(|e| ServiceLogError::IdentityResolution(e.to_string()))?;

        let cluster_id = versions
            .into_iter()
            .next()
            .map(|cv| cv.cluster_id)
            .ok_or_else(|| {
                ServiceLogError::IdentityResolution(
                    "Unable to find cluster version resource".to_string(),
                )
            })?;

        tracing::info!(
            cluster_id = %cluster_id,
            service_name = %service_name,
            api_url = %config.api_url,
            "Service log client initialized"
        );

        Ok(Self {
            config,
            cluster_id,
            service_name: service_name.to_string(),
            event_id: ArcSwap::from_pointee(EventId::default()),
        })
    }

    /// Get the resolved cluster identity.
    pub fn cluster_id(&self) -> &ClusterId {
        &self.cluster_id
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Snapshot of the current event ID.
    pub fn event_id(&self) -> EventId {
        (**self.event_id.load()).clone()
    }

    /// Wrap a counter-backed reporter so every transition is also logged.
    ///
    /// Fails with `UnsupportedReporter` for any reporter that does not
    /// expose a counter backend.
    pub fn attach_to_metrics_client(
        self: &Arc<Self>,
        reporter: Arc<dyn UpgradeMetrics>,
    ) -> ServiceLogResult<Arc<dyn UpgradeMetrics>> {
        let logger: Arc<dyn ServiceLogger> = self.clone();
        let audited = AuditedMetrics::attach(reporter, logger)?;
        Ok(Arc::new(audited))
    }

    /// Create a log entry under an explicit event ID.
    pub async fn create_log_with(
        &self,
        event_id: &EventId,
        summary: &str,
        description: &str,
    ) -> ServiceLogResult<()> {
        let connection = self.connect()?;

        let entry = LogEntry::new(
            &self.cluster_id,
            &self.service_name,
            event_id,
            summary,
            description,
        );

        tracing::debug!(
            event_id = %event_id,
            summary = %entry.summary,
            "Submitting service log"
        );

        connection.submit(&entry).await?;

        tracing::info!(
            cluster_id = %self.cluster_id,
            summary = %entry.summary,
            "Service log created"
        );
        Ok(())
    }

    /// Build the per-call connection.
    fn connect(&self) -> ServiceLogResult<Connection> {
        let base: Url = self.config.api_url.parse().map_err(|e| {
            ServiceLogError::Connection(format!("Invalid API URL '{}': {}", self.config.api_url, e))
        })?;
        let endpoint = base
            .join(CLUSTER_LOGS_PATH)
            .map_err(|e| ServiceLogError::Connection(format!("Invalid endpoint: {}", e)))?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.config.token))
            .map_err(|e| ServiceLogError::Connection(format!("Invalid token: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .pool_max_idle_per_host(0);
        if self.config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(self.config.timeout_secs));
        }

        let http = builder
            .build()
            .map_err(|e| ServiceLogError::Connection(e.to_string()))?;

        Ok(Connection { http, endpoint })
    }
}

#[async_trait]
impl ServiceLogger for ServiceLogClient {
    async fn create_log(&self, summary: &str, description: &str) -> ServiceLogResult<()> {
        let event_id = self.event_id();
        self.create_log_with(&event_id, summary, description).await
    }

    fn set_upgrade_event_id(&self, id: EventId) {
        tracing::debug!(event_id = %id, "Upgrade event ID set");
        self.event_id.store(Arc::new(id));
    }
}

impl std::fmt::Debug for ServiceLogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceLogClient")
            .field("cluster_id", &self.cluster_id)
            .field("service_name", &self.service_name)
            .field("api_url", &self.config.api_url)
            .field("event_id", &self.event_id())
            .finish()
    }
}

/// One unpooled connection, released when dropped.
struct Connection {
    http: reqwest::Client,
    endpoint: Url,
}

impl Connection {
    async fn submit(&self, entry: &LogEntry) -> ServiceLogResult<()> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(entry)
            .send()
            .await
            .map_err(|e| ServiceLogError::Submission(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            tracing::warn!(status = status.as_u16(), "Service log rejected");
            return Err(ServiceLogError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}
