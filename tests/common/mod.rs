//! Common test utilities
//!
//! A recording, scriptable [`ClusterClient`] and helpers for building
//! reconcilers over the shipped templates.

#![allow(dead_code, reason = "Not every test binary uses every helper")]

use async_trait::async_trait;
use nvidia_operator_controller::controller::manifests::{
    ManifestResource, ManifestSet, ResourceIdentity,
};
use nvidia_operator_controller::controller::reconciler::validation::RawConfig;
use nvidia_operator_controller::provider::{ClusterClient, ClusterError, ResourceStatus};
use nvidia_operator_controller::{Deployment, Reconciler};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

pub const APP_NAME: &str = "test-app";

pub const STRICT_POLICY: &str = "apiVersion: mellanox.com/v1alpha1
kind: NicClusterPolicy
metadata:
  name: nic-cluster-policy
spec:
  ofedDriver:
    image: doca-driver
";

/// Root of the shipped template sets
pub fn upstream() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("upstream")
}

pub fn manifest_set(deployment: Deployment) -> ManifestSet {
    ManifestSet::load(deployment, &upstream(), APP_NAME).expect("shipped templates load")
}

pub fn reconciler(deployment: Deployment) -> Reconciler<FakeClusterClient> {
    Reconciler::new(
        deployment,
        vec![manifest_set(deployment)],
        FakeClusterClient::default(),
    )
}

/// Deployment defaults with the given options overridden
pub fn options(deployment: Deployment, overrides: &[(&str, &str)]) -> RawConfig {
    let mut raw = deployment.default_options();
    for (key, value) in overrides {
        raw.insert((*key).to_string(), (*value).into());
    }
    raw
}

#[derive(Debug, Default)]
pub struct FakeClusterClient {
    applied: Mutex<Vec<ManifestResource>>,
    deleted: Mutex<Vec<ResourceIdentity>>,
    apply_failures: Mutex<VecDeque<ClusterError>>,
    delete_error: Mutex<Option<ClusterError>>,
    statuses: Mutex<Vec<ResourceStatus>>,
}

impl FakeClusterClient {
    /// Fail the next apply call with `error`
    pub fn fail_next_apply(&self, error: ClusterError) {
        self.apply_failures.lock().unwrap().push_back(error);
    }

    /// Fail every delete call with `error`
    pub fn fail_deletes(&self, error: ClusterError) {
        *self.delete_error.lock().unwrap() = Some(error);
    }

    pub fn clear_delete_failure(&self) {
        *self.delete_error.lock().unwrap() = None;
    }

    pub fn set_statuses(&self, statuses: Vec<ResourceStatus>) {
        *self.statuses.lock().unwrap() = statuses;
    }

    pub fn applied(&self) -> Vec<ManifestResource> {
        self.applied.lock().unwrap().clone()
    }

    pub fn applied_count(&self) -> usize {
        self.applied.lock().unwrap().len()
    }

    pub fn deleted(&self) -> Vec<ResourceIdentity> {
        self.deleted.lock().unwrap().clone()
    }

    /// Last applied resource with the given kind and name
    pub fn find_applied(&self, kind: &str, name: &str) -> Option<ManifestResource> {
        self.applied
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.kind() == kind && r.name() == name)
            .cloned()
    }
}

#[async_trait]
impl ClusterClient for FakeClusterClient {
    async fn apply(&self, resource: &ManifestResource) -> Result<(), ClusterError> {
        if let Some(error) = self.apply_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        self.applied.lock().unwrap().push(resource.clone());
        Ok(())
    }

    async fn delete(&self, resource: &ManifestResource) -> Result<(), ClusterError> {
        if let Some(error) = self.delete_error.lock().unwrap().clone() {
            return Err(error);
        }
        self.deleted.lock().unwrap().push(resource.identity());
        Ok(())
    }

    async fn list(&self, _selector: &str) -> Result<Vec<ResourceStatus>, ClusterError> {
        Ok(self.statuses.lock().unwrap().clone())
    }
}

pub fn unready(kind: &str, name: &str, reason: Option<&str>) -> ResourceStatus {
    ResourceStatus {
        kind: kind.to_string(),
        name: name.to_string(),
        namespace: Some("default".to_string()),
        ready: false,
        reason: reason.map(str::to_string),
    }
}
