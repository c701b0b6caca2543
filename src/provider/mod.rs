//! # Provider
//!
//! The cluster API collaborator. The reconciler only sees [`ClusterClient`];
//! [`kubernetes::KubeClusterClient`] is the implementation used against a live
//! cluster.

pub mod kubernetes;

use crate::controller::manifests::ManifestResource;
use async_trait::async_trait;
use thiserror::Error;

pub use kubernetes::KubeClusterClient;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    /// Retryable failure (API server unreachable, throttled, conflicting, 5xx)
    #[error("Transient cluster API failure: {0}")]
    Transient(String),

    /// Authorization denied
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other failure; fatal to the current trigger
    #[error("Cluster API error: {0}")]
    Api(String),
}

impl ClusterError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ClusterError::Transient(_))
    }
}

/// Readiness of one workload as reported by the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceStatus {
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
    pub ready: bool,
    pub reason: Option<String>,
}

impl ResourceStatus {
    /// `<Kind>/<namespace>/<name> is not ready[: reason]`
    pub fn unready_message(&self) -> String {
        let target = match &self.namespace {
            Some(namespace) => format!("{}/{}/{}", self.kind, namespace, self.name),
            None => format!("{}/{}", self.kind, self.name),
        };
        match &self.reason {
            Some(reason) => format!("{target} is not ready: {reason}"),
            None => format!("{target} is not ready"),
        }
    }
}

#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Idempotent create-or-update
    async fn apply(&self, resource: &ManifestResource) -> Result<(), ClusterError>;

    async fn delete(&self, resource: &ManifestResource) -> Result<(), ClusterError>;

    /// Workload readiness for every resource matching the label selector
    async fn list(&self, selector: &str) -> Result<Vec<ResourceStatus>, ClusterError>;
}
