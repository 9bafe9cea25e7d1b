//! `ClusterVersion` lookup against the Kubernetes API.

use async_trait::async_trait;
use kube::api::{Api, ApiResource, DynamicObject, GroupVersionKind, ListParams};
use kube::Client;

use super::{ClusterId, ClusterVersion, ClusterVersionLister};

/// Lists `config.openshift.io/v1` `ClusterVersion` objects.
#[derive(Clone)]
pub struct KubeClusterVersions {
    client: Client,
}

impl KubeClusterVersions {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Use the in-cluster or kubeconfig credentials.
    pub async fn try_default() -> Result<Self, kube::Error> {
        Ok(Self::new(Client::try_default().await?))
    }
}

#[async_trait]
impl ClusterVersionLister for KubeClusterVersions {
    async fn list_cluster_versions(
        &self,
    ) -> Result<Vec<ClusterVersion>, Box<dyn std::error::Error + Send + Sync>> {
        let gvk = GroupVersionKind::gvk("config.openshift.io", "v1", "ClusterVersion");
        let resource = ApiResource::from_gvk(&gvk);
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &resource);

        let list = api.list(&ListParams::default()).await?;

        let mut result = Vec::new();
        for object in list.items {
            let name = object.metadata.name.clone().unwrap_or_default();
            match object.data["spec"]["clusterID"].as_str() {
                Some(id) => result.push(ClusterVersion {
                    name,
                    cluster_id: ClusterId::from(id),
                }),
                None => tracing::warn!(name = %name, "ClusterVersion has no spec.clusterID"),
            }
        }

        Ok(result)
    }
}
