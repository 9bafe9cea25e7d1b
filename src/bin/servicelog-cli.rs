use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use upgrade_servicelog::cluster::{ClusterVersionLister, StaticClusterVersions};
use upgrade_servicelog::config::{load_config, AppConfig};
use upgrade_servicelog::observability;
use upgrade_servicelog::reporter::{AuditedMetrics, Counter, UpgradeMetrics};
use upgrade_servicelog::servicelog::{EventId, ServiceLogClient, ServiceLogger};

#[derive(Parser)]
#[command(name = "servicelog-cli")]
#[command(about = "Diagnostic CLI for the upgrade service log", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use this cluster ID instead of querying the cluster
    #[arg(long)]
    cluster_id: Option<String>,

    /// Override the configured service name
    #[arg(long)]
    service_name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a single service log entry
    Send {
        #[arg(long)]
        summary: String,
        #[arg(long)]
        description: String,
        /// Upgrade event ID (random when omitted)
        #[arg(long)]
        event_id: Option<String>,
    },
    /// Walk an upgrade config through a successful upgrade
    Replay {
        #[arg(long)]
        upgrade_config: String,
        #[arg(long, default_value = "4.14.1")]
        version: String,
        /// Upgrade event ID (random when omitted)
        #[arg(long)]
        event_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    config.apply_env();
    if let Some(name) = cli.service_name {
        config.service_name = name;
    }

    observability::logging::init(&config.observability.log_level);

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let lister = cluster_versions(cli.cluster_id.as_deref()).await?;
    let client = Arc::new(
        ServiceLogClient::new(lister.as_ref(), &config.service_name, config.servicelog.clone())
            .await?,
    );

    match cli.command {
        Commands::Send {
            summary,
            description,
            event_id,
        } => {
            client.set_upgrade_event_id(event_id_or_random(event_id));
            client.create_log(&summary, &description).await?;
            println!(
                "Service log created for cluster {} (event #{})",
                client.cluster_id(),
                client.event_id()
            );
        }
        Commands::Replay {
            upgrade_config,
            version,
            event_id,
        } => {
            client.set_upgrade_event_id(event_id_or_random(event_id));
            let logger: Arc<dyn ServiceLogger> = client.clone();
            let metrics = AuditedMetrics::attach(Arc::new(Counter::new()), logger)?;

            metrics.validation_succeeded(&upgrade_config).await;
            metrics.cluster_check_succeeded(&upgrade_config).await;
            metrics.upgrade_start_time(Utc::now(), &upgrade_config, &version).await;
            metrics.control_plane_end_time(Utc::now(), &upgrade_config, &version).await;
            metrics.node_upgrade_end_time(Utc::now(), &upgrade_config, &version).await;
            metrics.cluster_verification_succeeded(&upgrade_config).await;

            let failed = metrics.failed_submissions();
            println!(
                "Replayed 6 transitions for {} (event #{}), {} service logs failed",
                upgrade_config,
                client.event_id(),
                failed
            );
            if failed > 0 {
                return Err(format!("{} service logs could not be created", failed).into());
            }
        }
    }

    Ok(())
}

fn event_id_or_random(event_id: Option<String>) -> EventId {
    event_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
        .into()
}

async fn cluster_versions(
    cluster_id: Option<&str>,
) -> Result<Box<dyn ClusterVersionLister>, Box<dyn std::error::Error>> {
    match cluster_id {
        Some(id) => {
            let lister: Box<dyn ClusterVersionLister> = Box::new(StaticClusterVersions::single(id));
            Ok(lister)
        }
        None => in_cluster_versions().await,
    }
}

#[cfg(feature = "kube")]
async fn in_cluster_versions() -> Result<Box<dyn ClusterVersionLister>, Box<dyn std::error::Error>> {
    let lister = upgrade_servicelog::cluster::KubeClusterVersions::try_default().await?;
    Ok(Box::new(lister))
}

#[cfg(not(feature = "kube"))]
async fn in_cluster_versions() -> Result<Box<dyn ClusterVersionLister>, Box<dyn std::error::Error>> {
    Err("--cluster-id is required when built without the `kube` feature".into())
}
