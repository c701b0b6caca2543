//! # Kubernetes Cluster Client
//!
//! [`ClusterClient`] backed by `kube`: server-side apply of dynamic objects
//! resolved through API discovery, and readiness read from Deployment and
//! DaemonSet status.

use super::{ClusterClient, ClusterError, ResourceStatus};
use crate::controller::manifests::ManifestResource;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment};
use kube::{
    api::{Api, ApiResource, DeleteParams, ListParams, Patch, PatchParams},
    core::{DynamicObject, GroupVersionKind},
    discovery::{self, Scope},
    Client,
};
use tracing::{debug, info};

#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
    field_manager: String,
}

impl std::fmt::Debug for KubeClusterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClusterClient")
            .field("field_manager", &self.field_manager)
            .finish_non_exhaustive()
    }
}

impl KubeClusterClient {
    pub fn new(client: Client, field_manager: impl Into<String>) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
        }
    }

    /// Resolve the dynamic API for a resource through discovery
    async fn api_for(&self, resource: &ManifestResource) -> Result<Api<DynamicObject>, ClusterError> {
        let gvk = group_version_kind(resource)?;
        let (ar, caps): (ApiResource, _) = discovery::pinned_kind(&self.client, &gvk)
            .await
            .map_err(classify)?;

        Ok(match (caps.scope, resource.namespace()) {
            (Scope::Namespaced, Some(namespace)) => {
                Api::namespaced_with(self.client.clone(), namespace, &ar)
            }
            (Scope::Namespaced, None) => Api::default_namespaced_with(self.client.clone(), &ar),
            (Scope::Cluster, _) => Api::all_with(self.client.clone(), &ar),
        })
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn apply(&self, resource: &ManifestResource) -> Result<(), ClusterError> {
        // A custom resource whose CRD was applied moments ago may not be
        // discoverable yet; that resolves on retry
        let api = self.api_for(resource).await.map_err(|e| match e {
            ClusterError::NotFound(message) => ClusterError::Transient(message),
            other => other,
        })?;
        let params = PatchParams::apply(&self.field_manager).force();
        api.patch(resource.name(), &params, &Patch::Apply(resource.as_dynamic()))
            .await
            .map_err(classify)?;
        debug!("Applied {}", resource.identity());
        Ok(())
    }

    async fn delete(&self, resource: &ManifestResource) -> Result<(), ClusterError> {
        let api = self.api_for(resource).await?;
        api.delete(resource.name(), &DeleteParams::default())
            .await
            .map_err(classify)?;
        info!("Deleted {}", resource.identity());
        Ok(())
    }

    async fn list(&self, selector: &str) -> Result<Vec<ResourceStatus>, ClusterError> {
        let params = ListParams::default().labels(selector);
        let mut statuses = Vec::new();

        let deployments: Api<Deployment> = Api::all(self.client.clone());
        for deployment in deployments.list(&params).await.map_err(classify)? {
            statuses.push(deployment_status(&deployment));
        }

        let daemon_sets: Api<DaemonSet> = Api::all(self.client.clone());
        for daemon_set in daemon_sets.list(&params).await.map_err(classify)? {
            statuses.push(daemon_set_status(&daemon_set));
        }

        Ok(statuses)
    }
}

fn group_version_kind(resource: &ManifestResource) -> Result<GroupVersionKind, ClusterError> {
    let kind = resource.kind();
    let api_version = resource.api_version();
    if kind.is_empty() || api_version.is_empty() {
        return Err(ClusterError::Api(format!(
            "{} has no apiVersion or kind",
            resource.identity()
        )));
    }
    let (group, version) = api_version.split_once('/').unwrap_or(("", api_version));
    Ok(GroupVersionKind::gvk(group, version, kind))
}

/// Map a `kube` error onto the collaborator taxonomy
fn classify(error: kube::Error) -> ClusterError {
    let message = error.to_string();
    match &error {
        kube::Error::Api(status) => match status.code {
            401 | 403 => ClusterError::Unauthorized(message),
            404 => ClusterError::NotFound(message),
            409 | 429 | 500..=599 => ClusterError::Transient(message),
            _ => ClusterError::Api(message),
        },
        kube::Error::SerdeError(_) => ClusterError::Api(message),
        // Transport, TLS and discovery failures
        _ => ClusterError::Transient(message),
    }
}

fn deployment_status(deployment: &Deployment) -> ResourceStatus {
    let available = deployment
        .status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .and_then(|conditions| conditions.iter().find(|c| c.type_ == "Available"));

    let (ready, reason) = match available {
        Some(condition) if condition.status == "True" => (true, None),
        Some(condition) => (false, condition.message.clone()),
        None => (false, Some("no Available condition".to_string())),
    };

    ResourceStatus {
        kind: "Deployment".to_string(),
        name: deployment.metadata.name.clone().unwrap_or_default(),
        namespace: deployment.metadata.namespace.clone(),
        ready,
        reason,
    }
}

fn daemon_set_status(daemon_set: &DaemonSet) -> ResourceStatus {
    let (desired, ready) = daemon_set
        .status
        .as_ref()
        .map_or((0, 0), |s| (s.desired_number_scheduled, s.number_ready));

    ResourceStatus {
        kind: "DaemonSet".to_string(),
        name: daemon_set.metadata.name.clone().unwrap_or_default(),
        namespace: daemon_set.metadata.namespace.clone(),
        ready: ready >= desired,
        reason: (ready < desired).then(|| format!("{ready}/{desired} pods ready")),
    }
}
