use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::api::rbac::v1::Role;
use kube::api::{Api, ListParams, PatchParams};
use kube::{Client, Config};

use crate::error::Error;
use crate::patch::PatchOp;

/// Handle to the orchestration API: listing candidates and submitting
/// patches. The pipelines only ever see this trait, so tests can drive them
/// against an in-memory cluster.
#[async_trait]
pub trait Cluster: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, Error>;

    async fn list_roles(&self, namespace: &str) -> Result<Vec<Role>, Error>;

    async fn patch_namespace(&self, name: &str, op: &PatchOp) -> Result<(), Error>;

    async fn patch_role(&self, namespace: &str, name: &str, op: &PatchOp) -> Result<(), Error>;
}

/// The real client. Constructed once at startup and passed by reference into
/// the pipelines; connection parameters come from the ambient kubeconfig or
/// in-cluster service account.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    /// Infers the cluster configuration and bounds every request with the
    /// given timeout.
    pub async fn connect(timeout: Duration) -> Result<Self, Error> {
        let mut config = Config::infer().await?;
        config.connect_timeout = Some(timeout);
        config.read_timeout = Some(timeout);
        let client = Client::try_from(config)?;
        Ok(KubeCluster { client })
    }
}

#[async_trait]
impl Cluster for KubeCluster {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, Error> {
        let api = Api::<Namespace>::all(self.client.clone());
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn list_roles(&self, namespace: &str) -> Result<Vec<Role>, Error> {
        let api = Api::<Role>::namespaced(self.client.clone(), namespace);
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn patch_namespace(&self, name: &str, op: &PatchOp) -> Result<(), Error> {
        let api = Api::<Namespace>::all(self.client.clone());
        api.patch(name, &PatchParams::default(), &op.to_patch()?)
            .await
            .map_err(|source| Error::Patch {
                name: name.to_owned(),
                namespace: None,
                source,
            })?;
        Ok(())
    }

    async fn patch_role(&self, namespace: &str, name: &str, op: &PatchOp) -> Result<(), Error> {
        let api = Api::<Role>::namespaced(self.client.clone(), namespace);
        api.patch(name, &PatchParams::default(), &op.to_patch()?)
            .await
            .map_err(|source| Error::Patch {
                name: name.to_owned(),
                namespace: Some(namespace.to_owned()),
                source,
            })?;
        Ok(())
    }
}
