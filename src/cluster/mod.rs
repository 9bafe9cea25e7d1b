//! Cluster identity discovery.
//!
//! The service log is scoped to one cluster. Its identity comes from the
//! first `ClusterVersion` resource and is resolved once, when the log
//! client is built.

#[cfg(feature = "kube")]
pub mod kubernetes;

use async_trait::async_trait;

#[cfg(feature = "kube")]
pub use kubernetes::KubeClusterVersions;

/// Opaque cluster unique identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClusterId(pub String);

impl From<&str> for ClusterId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The parts of a cluster version resource this crate reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterVersion {
    /// Resource name (usually "version").
    pub name: String,
    /// `spec.clusterID`.
    pub cluster_id: ClusterId,
}

/// Source of cluster version resources.
#[async_trait]
pub trait ClusterVersionLister: Send + Sync {
    /// List every cluster version resource visible to the caller.
    async fn list_cluster_versions(
        &self,
    ) -> Result<Vec<ClusterVersion>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Fixed set of cluster versions, for tooling run outside a cluster.
#[derive(Debug, Clone, Default)]
pub struct StaticClusterVersions {
    versions: Vec<ClusterVersion>,
}

impl StaticClusterVersions {
    pub fn new(versions: Vec<ClusterVersion>) -> Self {
        Self { versions }
    }

    /// A single `version` resource carrying the given cluster ID.
    pub fn single(cluster_id: &str) -> Self {
        Self::new(vec![ClusterVersion {
            name: "version".to_string(),
            cluster_id: ClusterId::from(cluster_id),
        }])
    }
}

#[async_trait]
impl ClusterVersionLister for StaticClusterVersions {
    async fn list_cluster_versions(
        &self,
    ) -> Result<Vec<ClusterVersion>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.versions.clone())
    }
}
