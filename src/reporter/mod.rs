//! Upgrade metrics reporting.
//!
//! # Data Flow
//! ```text
//! upgrade controller (phase transition)
//!     → UpgradeMetrics
//!         → counter.rs  (counters and timestamp gauges)
//!         → audit.rs    (counter.rs, then one service log entry)
//! ```
//!
//! # Design Decisions
//! - The audit decorator only composes with reporters that expose a
//!   `CounterBackend`; anything else is refused at startup
//! - Every method is async so the decorator can await its submission
//!   after the metric has been recorded

pub mod audit;
pub mod counter;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub use audit::AuditedMetrics;
pub use counter::Counter;

/// Recording of upgrade phase transitions.
#[async_trait]
pub trait UpgradeMetrics: Send + Sync {
    /// An upgrade config passed validation.
    async fn validation_succeeded(&self, upgrade_config: &str);

    /// Pre-upgrade cluster health check passed.
    async fn cluster_check_succeeded(&self, upgrade_config: &str);

    /// Pre-upgrade cluster health check failed.
    async fn cluster_check_failed(&self, upgrade_config: &str);

    /// The upgrade started at `time`.
    async fn upgrade_start_time(&self, time: DateTime<Utc>, upgrade_config: &str, version: &str);

    /// The control plane finished upgrading at `time`.
    async fn control_plane_end_time(&self, time: DateTime<Utc>, upgrade_config: &str, version: &str);

    /// Worker nodes finished upgrading at `time`.
    async fn node_upgrade_end_time(&self, time: DateTime<Utc>, upgrade_config: &str, version: &str);

    /// Post-upgrade verification passed.
    async fn cluster_verification_succeeded(&self, upgrade_config: &str);

    /// Post-upgrade verification failed.
    async fn cluster_verification_failed(&self, upgrade_config: &str);

    /// The counter backend this reporter records through, if it has one.
    fn into_counter_backend(self: Arc<Self>) -> Option<Arc<dyn CounterBackend>> {
        None
    }
}

/// A reporter that records transitions as counters and gauges.
pub trait CounterBackend: UpgradeMetrics {
    /// Prefix shared by every series this backend writes.
    fn metric_namespace(&self) -> &str;
}

/// Reporter that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

#[async_trait]
impl UpgradeMetrics for NoopMetrics {
    async fn validation_succeeded(&self, _upgrade_config: &str) {}
    async fn cluster_check_succeeded(&self, _upgrade_config: &str) {}
    async fn cluster_check_failed(&self, _upgrade_config: &str) {}
    async fn upgrade_start_time(&self, _time: DateTime<Utc>, _upgrade_config: &str, _version: &str) {}
    async fn control_plane_end_time(&self, _time: DateTime<Utc>, _upgrade_config: &str, _version: &str) {}
    async fn node_upgrade_end_time(&self, _time: DateTime<Utc>, _upgrade_config: &str, _version: &str) {}
    async fn cluster_verification_succeeded(&self, _upgrade_config: &str) {}
    async fn cluster_verification_failed(&self, _upgrade_config: &str) {}
}
