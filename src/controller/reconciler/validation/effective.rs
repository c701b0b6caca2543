//! # Effective Configuration
//!
//! The merged, normalized configuration a manifest set is rendered from and
//! hashed over.

use crate::constants::{
    DEFAULT_NAMESPACE, OPTION_IMAGE_REGISTRY, OPTION_NAMESPACE, OPTION_NFD_WORKER_CONF,
    OPTION_NIC_CLUSTER_POLICY, OPTION_RELEASE,
};
use crate::controller::reconciler::validation::config::{is_unset, AvailableData};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    options: BTreeMap<String, serde_yaml::Value>,
}

impl EffectiveConfig {
    /// Merge validated options with the namespace the deployment lives in
    ///
    /// The injected namespace wins over the `namespace` option; a namespace
    /// change is surfaced by the status check instead of being rendered.
    pub fn merge(available: AvailableData, namespace: &str) -> Self {
        let mut options = available.into_inner();
        options.insert(
            OPTION_NAMESPACE.to_string(),
            serde_yaml::Value::String(namespace.to_string()),
        );
        options.retain(|_, value| !is_unset(value));
        Self { options }
    }

    pub fn namespace(&self) -> &str {
        self.string(OPTION_NAMESPACE).unwrap_or(DEFAULT_NAMESPACE)
    }

    /// Parsed NFD worker configuration, any YAML type
    pub fn nfd_worker_conf(&self) -> Option<&serde_yaml::Value> {
        self.options.get(OPTION_NFD_WORKER_CONF)
    }

    /// Parsed NicClusterPolicy document, any YAML type
    pub fn nic_cluster_policy(&self) -> Option<&serde_yaml::Value> {
        self.options.get(OPTION_NIC_CLUSTER_POLICY)
    }

    pub fn image_registry(&self) -> Option<&str> {
        self.string(OPTION_IMAGE_REGISTRY)
    }

    pub fn release(&self) -> Option<&str> {
        self.string(OPTION_RELEASE)
    }

    pub fn get(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.options.get(key)
    }

    /// All options in key order
    pub fn options(&self) -> &BTreeMap<String, serde_yaml::Value> {
        &self.options
    }

    fn string(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(serde_yaml::Value::as_str)
    }
}
