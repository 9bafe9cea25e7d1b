//! Counter-backed upgrade metrics.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::observability::metrics::{self, CheckResult, Milestone, METRICS_NAMESPACE};
use crate::reporter::{CounterBackend, UpgradeMetrics};

/// Records upgrade transitions through the `metrics` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct Counter;

impl Counter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UpgradeMetrics for Counter {
    async fn validation_succeeded(&self, upgrade_config: &str) {
        metrics::record_validation_succeeded(upgrade_config);
    }

    async fn cluster_check_succeeded(&self, upgrade_config: &str) {
        metrics::record_cluster_check(upgrade_config, CheckResult::Succeeded);
    }

    async fn cluster_check_failed(&self, upgrade_config: &str) {
        metrics::record_cluster_check(upgrade_config, CheckResult::Failed);
    }

    async fn upgrade_start_time(&self, time: DateTime<Utc>, upgrade_config: &str, version: &str) {
        metrics::record_milestone(Milestone::UpgradeStart, time, upgrade_config, version);
    }

    async fn control_plane_end_time(&self, time: DateTime<Utc>, upgrade_config: &str, version: &str) {
        metrics::record_milestone(Milestone::ControlPlaneEnd, time, upgrade_config, version);
    }

    async fn node_upgrade_end_time(&self, time: DateTime<Utc>, upgrade_config: &str, version: &str) {
        metrics::record_milestone(Milestone::WorkerNodeEnd, time, upgrade_config, version);
    }

    async fn cluster_verification_succeeded(&self, upgrade_config: &str) {
        metrics::record_cluster_verification(upgrade_config, CheckResult::Succeeded);
    }

    async fn cluster_verification_failed(&self, upgrade_config: &str) {
        metrics::record_cluster_verification(upgrade_config, CheckResult::Failed);
    }

    fn into_counter_backend(self: Arc<Self>) -> Option<Arc<dyn CounterBackend>> {
        Some(self)
    }
}

impl CounterBackend for Counter {
    fn metric_namespace(&self) -> &str {
        METRICS_NAMESPACE
    }
}
