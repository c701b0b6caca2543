//! # Types
//!
//! Triggers, errors, and the reconciler context.

use crate::config::ControllerConfig;
use crate::controller::deployment::Deployment;
use crate::controller::manifests::{ManifestError, ManifestSet};
use crate::controller::reconciler::validation::ConfigValidator;
use crate::provider::{ClusterClient, ClusterError};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Events delivered by the lifecycle manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    ConfigChanged,
    Install,
    Upgrade,
    UpdateStatus,
    Stop,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::ConfigChanged => "config-changed",
            Trigger::Install => "install",
            Trigger::Upgrade => "upgrade",
            Trigger::UpdateStatus => "update-status",
            Trigger::Stop => "stop",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Trigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "config-changed" => Ok(Trigger::ConfigChanged),
            "install" => Ok(Trigger::Install),
            "upgrade" => Ok(Trigger::Upgrade),
            "update-status" => Ok(Trigger::UpdateStatus),
            "stop" => Ok(Trigger::Stop),
            other => Err(format!("unknown trigger '{other}'")),
        }
    }
}

/// Failures that end the current trigger
///
/// Transient cluster failures never surface here; they defer the trigger.
#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("Cluster error: {0}")]
    Cluster(#[from] ClusterError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
}

/// Reconciler context for one deployment
#[derive(Debug)]
pub struct Reconciler<C: ClusterClient> {
    pub(crate) deployment: Deployment,
    pub(crate) validator: ConfigValidator,
    pub(crate) manifests: Vec<ManifestSet>,
    pub(crate) client: C,
}

impl<C: ClusterClient> Reconciler<C> {
    pub fn new(deployment: Deployment, manifests: Vec<ManifestSet>, client: C) -> Self {
        Self {
            deployment,
            validator: ConfigValidator::new(deployment.governed_fields()),
            manifests,
            client,
        }
    }

    /// Load the deployment's templates from the configured manifests root
    pub fn load(
        deployment: Deployment,
        config: &ControllerConfig,
        client: C,
    ) -> Result<Self, ManifestError> {
        let manifests = ManifestSet::load(deployment, &config.manifests_dir, &config.app_name)?;
        Ok(Self::new(deployment, vec![manifests], client))
    }

    pub fn deployment(&self) -> Deployment {
        self.deployment
    }

    pub fn validator(&self) -> &ConfigValidator {
        &self.validator
    }

    pub fn manifests(&self) -> &[ManifestSet] {
        &self.manifests
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}
