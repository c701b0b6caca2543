//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Namespace used when the `namespace` option is unset or empty
pub const DEFAULT_NAMESPACE: &str = "default";

/// Default application name written into the ownership label
pub const DEFAULT_APP_NAME: &str = "nvidia-operator";

/// Default root directory holding the per-deployment template sets
pub const DEFAULT_MANIFESTS_DIR: &str = "upstream";

/// Default server-side-apply field manager
pub const DEFAULT_FIELD_MANAGER: &str = "nvidia-operator-controller";

// Configuration option names

/// Target namespace option
pub const OPTION_NAMESPACE: &str = "namespace";

/// YAML-encoded node-feature-discovery worker configuration
pub const OPTION_NFD_WORKER_CONF: &str = "nfd-worker-conf";

/// YAML-encoded NicClusterPolicy document (network deployment only)
pub const OPTION_NIC_CLUSTER_POLICY: &str = "nic-cluster-policy";

/// Schema strictness applied to the NicClusterPolicy document
pub const OPTION_NIC_CLUSTER_POLICY_VALIDATION: &str = "nic-cluster-policy-validation";

/// Registry prefix that replaces the registry of every container image
pub const OPTION_IMAGE_REGISTRY: &str = "image-registry";

/// Manifest release to deploy (newest on disk when unset)
pub const OPTION_RELEASE: &str = "release";

// Labels

/// Ownership label added to every rendered resource
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Manifest-set label, also used as the readiness probe selector
pub const LABEL_MANIFEST: &str = "nvidia.operator/manifest";

/// Manifest release label
pub const LABEL_MANIFEST_VERSION: &str = "nvidia.operator/manifest-version";

// NFD worker ConfigMap

/// Data key the NFD worker configuration is written under
pub const NFD_WORKER_CONF_DATA_KEY: &str = "nfd-worker.conf";

/// Literal `kind` required of the NicClusterPolicy document
pub const NIC_CLUSTER_POLICY_KIND: &str = "NicClusterPolicy";

// Status messages

pub const STATUS_EVALUATING_CONFIG: &str = "Evaluating charm config.";
pub const STATUS_EVALUATING_MANIFESTS: &str = "Evaluating Manifests";
pub const STATUS_UPDATING: &str = "Updating Status";
pub const STATUS_WAITING_FOR_APISERVER: &str = "Waiting for kube-apiserver";
pub const STATUS_SHUTTING_DOWN: &str = "Shutting down";
pub const STATUS_READY: &str = "Ready";

/// Exit code used by the CLI when the trigger was deferred (`EX_TEMPFAIL`)
pub const EXIT_CODE_DEFERRED: i32 = 75;

/// `apiVersion` given to a NicClusterPolicy document that omits it
pub const NIC_CLUSTER_POLICY_API_VERSION: &str = "mellanox.com/v1alpha1";

/// Name given to a NicClusterPolicy document that omits it
pub const NIC_CLUSTER_POLICY_NAME: &str = "nic-cluster-policy";
