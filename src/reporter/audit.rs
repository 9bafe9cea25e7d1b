//! Upgrade metrics with a service log audit trail.
//!
//! Every transition is recorded on the wrapped counter first and then
//! described in one service log entry. Log failures never reach the caller:
//! they are counted and emitted on the audit target instead.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::observability::metrics::record_servicelog_failure;
use crate::reporter::{CounterBackend, UpgradeMetrics};
use crate::servicelog::{ServiceLogError, ServiceLogResult, ServiceLogger};

/// Tracing target for audit-channel events.
pub const AUDIT_TARGET: &str = "upgrade_servicelog::audit";

/// An upgrade phase transition and the arguments it was reported with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<'a> {
    ValidationSucceeded { upgrade_config: &'a str },
    ClusterCheckSucceeded { upgrade_config: &'a str },
    ClusterCheckFailed { upgrade_config: &'a str },
    UpgradeStarted { at: DateTime<Utc>, upgrade_config: &'a str },
    ControlPlaneCompleted { at: DateTime<Utc>, upgrade_config: &'a str },
    WorkerNodesCompleted { at: DateTime<Utc>, upgrade_config: &'a str },
    VerificationSucceeded { upgrade_config: &'a str },
    VerificationFailed { upgrade_config: &'a str },
}

impl Transition<'_> {
    /// Stable event name used in logs and failure metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Transition::ValidationSucceeded { .. } => "validation_succeeded",
            Transition::ClusterCheckSucceeded { .. } => "cluster_check_succeeded",
            Transition::ClusterCheckFailed { .. } => "cluster_check_failed",
            Transition::UpgradeStarted { .. } => "upgrade_started",
            Transition::ControlPlaneCompleted { .. } => "control_plane_completed",
            Transition::WorkerNodesCompleted { .. } => "worker_nodes_completed",
            Transition::VerificationSucceeded { .. } => "verification_succeeded",
            Transition::VerificationFailed { .. } => "verification_failed",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Transition::ValidationSucceeded { .. } | Transition::ClusterCheckSucceeded { .. } => {
                "Upgrade starting"
            }
            Transition::ClusterCheckFailed { .. } | Transition::VerificationFailed { .. } => {
                "Upgrade failed"
            }
            Transition::UpgradeStarted { .. }
            | Transition::ControlPlaneCompleted { .. }
            | Transition::WorkerNodesCompleted { .. }
            | Transition::VerificationSucceeded { .. } => "Upgrade progressing",
        }
    }

    pub fn description(&self) -> String {
        match self {
            Transition::ValidationSucceeded { upgrade_config } => {
                format!("Passed validation of an upgrade config - {}", upgrade_config)
            }
            Transition::ClusterCheckSucceeded { upgrade_config } => {
                format!("Passed cluster health check - {}", upgrade_config)
            }
            Transition::ClusterCheckFailed { upgrade_config } => {
                format!("Failed cluster health check - {}", upgrade_config)
            }
            Transition::UpgradeStarted { at, upgrade_config } => {
                format!("Upgrade started at {} - {}", at, upgrade_config)
            }
            Transition::ControlPlaneCompleted { at, upgrade_config } => {
                format!("Upgrade of control plane completed at {} - {}", at, upgrade_config)
            }
            Transition::WorkerNodesCompleted { at, upgrade_config } => {
                format!("Upgrade of worker nodes completed at {} - {}", at, upgrade_config)
            }
            Transition::VerificationSucceeded { upgrade_config } => {
                format!("Passed post-upgrade verification - {}", upgrade_config)
            }
            Transition::VerificationFailed { upgrade_config } => {
                format!("Post-upgrade verification has failed - {}", upgrade_config)
            }
        }
    }
}

/// Counter-backed reporter that also writes a service log per transition.
pub struct AuditedMetrics {
    counter: Arc<dyn CounterBackend>,
    logger: Arc<dyn ServiceLogger>,
    failed: AtomicU64,
}

impl AuditedMetrics {
    /// Attach `logger` to a reporter.
    ///
    /// Only reporters exposing a counter backend are accepted; anything
    /// else fails with `UnsupportedReporter`.
    pub fn attach(
        reporter: Arc<dyn UpgradeMetrics>,
        logger: Arc<dyn ServiceLogger>,
    ) -> ServiceLogResult<Self> {
        let counter = reporter.into_counter_backend().ok_or_else(|| {
            ServiceLogError::UnsupportedReporter(
                "reporter does not expose a counter backend".to_string(),
            )
        })?;

        tracing::debug!(
            namespace = counter.metric_namespace(),
            "Service log attached to metrics reporter"
        );

        Ok(Self {
            counter,
            logger,
            failed: AtomicU64::new(0),
        })
    }

    /// Number of transitions whose log entry could not be created.
    pub fn failed_submissions(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    async fn audit(&self, transition: Transition<'_>) {
        let description = transition.description();
        if let Err(e) = self.logger.create_log(transition.summary(), &description).await {
            self.failed.fetch_add(1, Ordering::Relaxed);
            record_servicelog_failure(transition.name());
            tracing::warn!(
                target: AUDIT_TARGET,
                event = transition.name(),
                error = %e,
                description = %description,
                "Service log not created"
            );
        }
    }
}

#[async_trait]
impl UpgradeMetrics for AuditedMetrics {
    async fn validation_succeeded(&self, upgrade_config: &str) {
        self.counter.validation_succeeded(upgrade_config).await;
        self.audit(Transition::ValidationSucceeded { upgrade_config }).await;
    }

    async fn cluster_check_succeeded(&self, upgrade_config: &str) {
        self.counter.cluster_check_succeeded(upgrade_config).await;
        self.audit(Transition::ClusterCheckSucceeded { upgrade_config }).await;
    }

    async fn cluster_check_failed(&self, upgrade_config: &str) {
        self.counter.cluster_check_failed(upgrade_config).await;
        self.audit(Transition::ClusterCheckFailed { upgrade_config }).await;
    }

    async fn upgrade_start_time(&self, time: DateTime<Utc>, upgrade_config: &str, version: &str) {
        self.counter.upgrade_start_time(time, upgrade_config, version).await;
        self.audit(Transition::UpgradeStarted { at: time, upgrade_config }).await;
    }

    async fn control_plane_end_time(&self, time: DateTime<Utc>, upgrade_config: &str, version: &str) {
        self.counter.control_plane_end_time(time, upgrade_config, version).await;
        self.audit(Transition::ControlPlaneCompleted { at: time, upgrade_config }).await;
    }

    async fn node_upgrade_end_time(&self, time: DateTime<Utc>, upgrade_config: &str, version: &str) {
        self.counter.node_upgrade_end_time(time, upgrade_config, version).await;
        self.audit(Transition::WorkerNodesCompleted { at: time, upgrade_config }).await;
    }

    async fn cluster_verification_succeeded(&self, upgrade_config: &str) {
        self.counter.cluster_verification_succeeded(upgrade_config).await;
        self.audit(Transition::VerificationSucceeded { upgrade_config }).await;
    }

    async fn cluster_verification_failed(&self, upgrade_config: &str) {
        self.counter.cluster_verification_failed(upgrade_config).await;
        self.audit(Transition::VerificationFailed { upgrade_config }).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::NoopMetrics;
    use crate::servicelog::EventId;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Counts calls per method and records call order into a shared journal.
    #[derive(Default)]
    struct FakeCounter {
        calls: Mutex<Vec<&'static str>>,
        journal: Arc<Mutex<Vec<String>>>,
    }

    impl FakeCounter {
        fn with_journal(journal: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                journal,
            }
        }

        fn record(&self, method: &'static str) {
            self.calls.lock().unwrap().push(method);
            self.journal.lock().unwrap().push(format!("metric:{}", method));
        }

        fn count(&self, method: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|m| **m == method).count()
        }
    }

    #[async_trait]
    impl UpgradeMetrics for FakeCounter {
        async fn validation_succeeded(&self, _: &str) {
            self.record("validation_succeeded");
        }
        async fn cluster_check_succeeded(&self, _: &str) {
            self.record("cluster_check_succeeded");
        }
        async fn cluster_check_failed(&self, _: &str) {
            self.record("cluster_check_failed");
        }
        async fn upgrade_start_time(&self, _: DateTime<Utc>, _: &str, _: &str) {
            self.record("upgrade_start_time");
        }
        async fn control_plane_end_time(&self, _: DateTime<Utc>, _: &str, _: &str) {
            self.record("control_plane_end_time");
        }
        async fn node_upgrade_end_time(&self, _: DateTime<Utc>, _: &str, _: &str) {
            self.record("node_upgrade_end_time");
        }
        async fn cluster_verification_succeeded(&self, _: &str) {
            self.record("cluster_verification_succeeded");
        }
        async fn cluster_verification_failed(&self, _: &str) {
            self.record("cluster_verification_failed");
        }

        fn into_counter_backend(self: Arc<Self>) -> Option<Arc<dyn CounterBackend>> {
            Some(self)
        }
    }

    impl CounterBackend for FakeCounter {
        fn metric_namespace(&self) -> &str {
            "fake"
        }
    }

    /// Records every submission; fails all of them when `fail` is set.
    #[derive(Default)]
    struct FakeLogger {
        fail: bool,
        entries: Mutex<Vec<(String, String)>>,
        journal: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ServiceLogger for FakeLogger {
        async fn create_log(&self, summary: &str, description: &str) -> ServiceLogResult<()> {
            self.journal.lock().unwrap().push(format!("log:{}", summary));
            self.entries
                .lock()
                .unwrap()
                .push((summary.to_string(), description.to_string()));
            if self.fail {
                return Err(ServiceLogError::UnexpectedStatus { status: 500 });
            }
            Ok(())
        }

        fn set_upgrade_event_id(&self, _id: EventId) {}
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    async fn drive_all(metrics: &dyn UpgradeMetrics) {
        metrics.validation_succeeded("uc").await;
        metrics.cluster_check_succeeded("uc").await;
        metrics.cluster_check_failed("uc").await;
        metrics.upgrade_start_time(at(), "uc", "4.14.1").await;
        metrics.control_plane_end_time(at(), "uc", "4.14.1").await;
        metrics.node_upgrade_end_time(at(), "uc", "4.14.1").await;
        metrics.cluster_verification_succeeded("uc").await;
        metrics.cluster_verification_failed("uc").await;
    }

    const ALL_METHODS: [&str; 8] = [
        "validation_succeeded",
        "cluster_check_succeeded",
        "cluster_check_failed",
        "upgrade_start_time",
        "control_plane_end_time",
        "node_upgrade_end_time",
        "cluster_verification_succeeded",
        "cluster_verification_failed",
    ];

    #[test]
    fn test_transition_table() {
        let cases = [
            (
                Transition::ValidationSucceeded { upgrade_config: "uc" },
                "Upgrade starting",
                "Passed validation of an upgrade config - uc",
            ),
            (
                Transition::ClusterCheckSucceeded { upgrade_config: "uc" },
                "Upgrade starting",
                "Passed cluster health check - uc",
            ),
            (
                Transition::ClusterCheckFailed { upgrade_config: "uc" },
                "Upgrade failed",
                "Failed cluster health check - uc",
            ),
            (
                Transition::UpgradeStarted { at: at(), upgrade_config: "uc" },
                "Upgrade progressing",
                "Upgrade started at 2024-03-01 12:30:00 UTC - uc",
            ),
            (
                Transition::ControlPlaneCompleted { at: at(), upgrade_config: "uc" },
                "Upgrade progressing",
                "Upgrade of control plane completed at 2024-03-01 12:30:00 UTC - uc",
            ),
            (
                Transition::WorkerNodesCompleted { at: at(), upgrade_config: "uc" },
                "Upgrade progressing",
                "Upgrade of worker nodes completed at 2024-03-01 12:30:00 UTC - uc",
            ),
            (
                Transition::VerificationSucceeded { upgrade_config: "uc" },
                "Upgrade progressing",
                "Passed post-upgrade verification - uc",
            ),
            (
                Transition::VerificationFailed { upgrade_config: "uc" },
                "Upgrade failed",
                "Post-upgrade verification has failed - uc",
            ),
        ];

        for (transition, summary, description) in cases {
            assert_eq!(transition.summary(), summary, "{}", transition.name());
            assert_eq!(transition.description(), description, "{}", transition.name());
        }
    }

    #[tokio::test]
    async fn test_each_method_records_once_and_logs_once() {
        let counter = Arc::new(FakeCounter::default());
        let logger = Arc::new(FakeLogger::default());
        let audited = AuditedMetrics::attach(counter.clone(), logger.clone()).unwrap();

        drive_all(&audited).await;

        for method in ALL_METHODS {
            assert_eq!(counter.count(method), 1, "{}", method);
        }
        assert_eq!(logger.entries.lock().unwrap().len(), 8);
        assert_eq!(audited.failed_submissions(), 0);
    }

    #[tokio::test]
    async fn test_log_failures_are_contained_and_counted() {
        let counter = Arc::new(FakeCounter::default());
        let logger = Arc::new(FakeLogger {
            fail: true,
            ..FakeLogger::default()
        });
        let audited = AuditedMetrics::attach(counter.clone(), logger.clone()).unwrap();

        drive_all(&audited).await;

        for method in ALL_METHODS {
            assert_eq!(counter.count(method), 1, "{}", method);
        }
        assert_eq!(logger.entries.lock().unwrap().len(), 8);
        assert_eq!(audited.failed_submissions(), 8);
    }

    #[tokio::test]
    async fn test_metric_recorded_before_log() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let counter = Arc::new(FakeCounter::with_journal(journal.clone()));
        let logger = Arc::new(FakeLogger {
            journal: journal.clone(),
            ..FakeLogger::default()
        });
        let audited = AuditedMetrics::attach(counter, logger).unwrap();

        audited.cluster_check_failed("uc").await;

        assert_eq!(
            *journal.lock().unwrap(),
            vec!["metric:cluster_check_failed".to_string(), "log:Upgrade failed".to_string()]
        );
    }

    #[tokio::test]
    async fn test_cluster_check_succeeded_entry() {
        let counter = Arc::new(FakeCounter::default());
        let logger = Arc::new(FakeLogger::default());
        let audited = AuditedMetrics::attach(counter.clone(), logger.clone()).unwrap();

        audited.cluster_check_succeeded("my-upgrade").await;

        assert_eq!(counter.count("cluster_check_succeeded"), 1);
        assert_eq!(
            *logger.entries.lock().unwrap(),
            vec![(
                "Upgrade starting".to_string(),
                "Passed cluster health check - my-upgrade".to_string()
            )]
        );
    }

    #[test]
    fn test_attach_rejects_non_counter_reporter() {
        let result = AuditedMetrics::attach(Arc::new(NoopMetrics), Arc::new(FakeLogger::default()));
        assert!(matches!(result, Err(ServiceLogError::UnsupportedReporter(_))));
    }

    #[test]
    fn test_attach_rejects_already_audited_reporter() {
        let audited = AuditedMetrics::attach(
            Arc::new(FakeCounter::default()),
            Arc::new(FakeLogger::default()),
        )
        .unwrap();

        let result = AuditedMetrics::attach(Arc::new(audited), Arc::new(FakeLogger::default()));
        assert!(matches!(result, Err(ServiceLogError::UnsupportedReporter(_))));
    }
}
