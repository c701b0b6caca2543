//! # Deployments
//!
//! The two bounded deployments this controller manages, and everything that
//! differs between them: template directory, option surface, governed YAML
//! options, transform chain, and the custom resource synthesized from options.

use crate::constants::{
    OPTION_IMAGE_REGISTRY, OPTION_NAMESPACE, OPTION_NFD_WORKER_CONF, OPTION_NIC_CLUSTER_POLICY,
    OPTION_NIC_CLUSTER_POLICY_VALIDATION, OPTION_RELEASE,
};
use crate::controller::manifests::transforms::{
    ConfigMapDataInjector, LabelInjector, ManifestTransform, NamespaceRewriter, RegistryRewriter,
};
use crate::controller::reconciler::validation::{FieldSchema, GovernedField, RawConfig};
use std::fmt;
use std::str::FromStr;

/// Default NFD worker configuration shipped as the option default
const DEFAULT_NFD_WORKER_CONF: &str = r#"sources:
  pci:
    deviceClassWhitelist:
      - "02"
      - "0200"
      - "0207"
      - "0300"
      - "0302"
    deviceLabelFields:
      - vendor
"#;

const NFD_WORKER: GovernedField = GovernedField {
    name: OPTION_NFD_WORKER_CONF,
    required: true,
    schema: FieldSchema::NfdWorker,
};

const NIC_CLUSTER_POLICY: GovernedField = GovernedField {
    name: OPTION_NIC_CLUSTER_POLICY,
    required: false,
    schema: FieldSchema::NicClusterPolicy,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Deployment {
    GpuOperator,
    NetworkOperator,
}

impl Deployment {
    /// Manifest set name, also the template directory under the manifests root
    pub fn manifest_name(&self) -> &'static str {
        match self {
            Deployment::GpuOperator => "gpu-operator",
            Deployment::NetworkOperator => "network-operator",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Deployment::GpuOperator => "NVIDIA GPU Operator",
            Deployment::NetworkOperator => "NVIDIA Network Operator",
        }
    }

    /// Name of the ConfigMap holding the NFD worker configuration
    pub fn nfd_config_map(&self) -> &'static str {
        match self {
            Deployment::GpuOperator => "nvidia-charm-node-feature-discovery-worker-conf",
            Deployment::NetworkOperator => "nvidia-network-charm-node-feature-discovery-worker-conf",
        }
    }

    /// YAML-carrying options, in evaluation order
    pub fn governed_fields(&self) -> &'static [GovernedField] {
        match self {
            Deployment::GpuOperator => &[NFD_WORKER],
            Deployment::NetworkOperator => &[NFD_WORKER, NIC_CLUSTER_POLICY],
        }
    }

    /// Option that carries the custom resource applied after the templates
    pub fn custom_resource_option(&self) -> Option<&'static str> {
        match self {
            Deployment::GpuOperator => None,
            Deployment::NetworkOperator => Some(OPTION_NIC_CLUSTER_POLICY),
        }
    }

    /// Transform chain in the order it runs over every resource
    pub fn transforms(&self) -> Vec<Box<dyn ManifestTransform>> {
        vec![
            Box::new(LabelInjector),
            Box::new(RegistryRewriter),
            Box::new(ConfigMapDataInjector::new(self.nfd_config_map())),
            Box::new(NamespaceRewriter),
        ]
    }

    /// The option surface with its defaults
    pub fn default_options(&self) -> RawConfig {
        let mut options = RawConfig::new();
        options.insert(OPTION_NAMESPACE.to_string(), "".into());
        options.insert(OPTION_NFD_WORKER_CONF.to_string(), DEFAULT_NFD_WORKER_CONF.into());
        options.insert(OPTION_IMAGE_REGISTRY.to_string(), "".into());
        options.insert(OPTION_RELEASE.to_string(), "".into());
        if *self == Deployment::NetworkOperator {
            options.insert(OPTION_NIC_CLUSTER_POLICY.to_string(), "".into());
            options.insert(
                OPTION_NIC_CLUSTER_POLICY_VALIDATION.to_string(),
                "strict".into(),
            );
        }
        options
    }
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manifest_name())
    }
}

impl FromStr for Deployment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gpu" | "gpu-operator" => Ok(Deployment::GpuOperator),
            "network" | "network-operator" => Ok(Deployment::NetworkOperator),
            other => Err(format!(
                "unknown deployment '{other}', expected one of: gpu-operator, network-operator"
            )),
        }
    }
}
