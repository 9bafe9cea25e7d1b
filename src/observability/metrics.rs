//! Metrics collection and exposition.
//!
//! # Metrics
//! - `upgradeoperator_validation_succeeded_total` (counter): by upgrade config
//! - `upgradeoperator_cluster_check_total` (counter): by upgrade config, result
//! - `upgradeoperator_cluster_verification_total` (counter): by upgrade config, result
//! - `upgradeoperator_upgrade_start_timestamp` (gauge): unix seconds
//! - `upgradeoperator_controlplane_end_timestamp` (gauge): unix seconds
//! - `upgradeoperator_workernode_end_timestamp` (gauge): unix seconds
//! - `upgradeoperator_servicelog_failures_total` (counter): by event
//!
//! Without an installed recorder every call is a no-op.

use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Prefix of every series recorded here.
pub const METRICS_NAMESPACE: &str = "upgradeoperator";

/// Outcome label for check counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResult {
    Succeeded,
    Failed,
}

impl CheckResult {
    fn as_str(self) -> &'static str {
        match self {
            CheckResult::Succeeded => "succeeded",
            CheckResult::Failed => "failed",
        }
    }
}

/// Timestamped upgrade milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    UpgradeStart,
    ControlPlaneEnd,
    WorkerNodeEnd,
}

impl Milestone {
    fn gauge_name(self) -> &'static str {
        match self {
            Milestone::UpgradeStart => "upgradeoperator_upgrade_start_timestamp",
            Milestone::ControlPlaneEnd => "upgradeoperator_controlplane_end_timestamp",
            Milestone::WorkerNodeEnd => "upgradeoperator_workernode_end_timestamp",
        }
    }
}

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_validation_succeeded(upgrade_config: &str) {
    ::metrics::counter!(
        "upgradeoperator_validation_succeeded_total",
        "upgradeconfig_name" => upgrade_config.to_string()
    )
    .increment(1);
}

pub fn record_cluster_check(upgrade_config: &str, result: CheckResult) {
    ::metrics::counter!(
        "upgradeoperator_cluster_check_total",
        "upgradeconfig_name" => upgrade_config.to_string(),
        "result" => result.as_str()
    )
    .increment(1);
}

pub fn record_cluster_verification(upgrade_config: &str, result: CheckResult) {
    ::metrics::counter!(
        "upgradeoperator_cluster_verification_total",
        "upgradeconfig_name" => upgrade_config.to_string(),
        "result" => result.as_str()
    )
    .increment(1);
}

pub fn record_milestone(milestone: Milestone, time: DateTime<Utc>, upgrade_config: &str, version: &str) {
    ::metrics::gauge!(
        milestone.gauge_name(),
        "upgradeconfig_name" => upgrade_config.to_string(),
        "version" => version.to_string()
    )
    .set(time.timestamp() as f64);
}

/// Count a service log entry the audit channel failed to create.
pub fn record_servicelog_failure(event: &'static str) {
    ::metrics::counter!("upgradeoperator_servicelog_failures_total", "event" => event).increment(1);
}
