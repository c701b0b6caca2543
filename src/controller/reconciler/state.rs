//! # Controller State
//!
//! State carried between triggers. Only the success paths of install/upgrade
//! and teardown write to it.

use crate::controller::manifests::ConfigHash;
use crate::controller::reconciler::validation::{configured_namespace, RawConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerState {
    /// Hash of the configuration last applied successfully
    #[serde(default)]
    pub last_applied_hash: Option<ConfigHash>,
    #[serde(default)]
    pub deployed: bool,
    /// Namespace the resources were first deployed into
    pub namespace: String,
}

impl ControllerState {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            last_applied_hash: None,
            deployed: false,
            namespace: namespace.into(),
        }
    }

    /// State for a fresh install, pinned to the namespace the options request
    pub fn initial(raw: &RawConfig) -> Self {
        Self::new(configured_namespace(raw))
    }
}
