//! Service log audit trail for managed cluster upgrades.
//!
//! Wraps the counter-backed upgrade metrics reporter so that every upgrade
//! phase transition is also written, in prose, to the remote service log of
//! the cluster being upgraded.

pub mod cluster;
pub mod config;
pub mod observability;
pub mod reporter;
pub mod servicelog;

pub use config::schema::AppConfig;
pub use reporter::{AuditedMetrics, Counter, UpgradeMetrics};
pub use servicelog::{ServiceLogClient, ServiceLogError, ServiceLogger};
