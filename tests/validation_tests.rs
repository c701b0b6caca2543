//! # Validation Tests
//!
//! Option validation and normalization for both deployments.
//!
//! These tests verify:
//! - YAML parse failures and schema violations are reported per field
//! - The first failing field wins, worker configuration before policy
//! - Policy strictness is selected by an option
//! - Unset and empty options are dropped from the available data

mod common;

use common::{options, STRICT_POLICY};
use nvidia_operator_controller::controller::reconciler::validation::{
    configured_namespace, policy_strictness, ConfigValidator, PolicyStrictness, RawConfig,
};
use nvidia_operator_controller::Deployment;

fn validator(deployment: Deployment) -> ConfigValidator {
    ConfigValidator::new(deployment.governed_fields())
}

#[test]
fn test_nfd_worker_conf_sources() {
    let cases = [
        ("sources: {}", None),
        ("foo: '", Some("nfd-worker-conf is not valid YAML")),
        ("foo: bar", Some("nfd-worker-conf is invalid")),
        ("sources: []", Some("nfd-worker-conf is invalid")),
        ("", Some("nfd-worker-conf is not valid YAML")),
    ];

    for (nfd, expected) in cases {
        let raw = options(Deployment::GpuOperator, &[("nfd-worker-conf", nfd)]);
        assert_eq!(
            validator(Deployment::GpuOperator).evaluate(&raw).as_deref(),
            expected,
            "nfd-worker-conf {nfd:?}"
        );
    }
}

#[test]
fn test_shipped_defaults_are_valid() {
    for deployment in [Deployment::GpuOperator, Deployment::NetworkOperator] {
        let raw = deployment.default_options();
        assert_eq!(validator(deployment).evaluate(&raw), None, "{deployment}");
    }
}

#[test]
fn test_policy_strictness_variants() {
    let kind_only = "kind: NicClusterPolicy";

    let strict = options(
        Deployment::NetworkOperator,
        &[("nic-cluster-policy", kind_only)],
    );
    assert_eq!(
        validator(Deployment::NetworkOperator).evaluate(&strict),
        Some("nic-cluster-policy is invalid".to_string())
    );

    let lenient = options(
        Deployment::NetworkOperator,
        &[
            ("nic-cluster-policy", kind_only),
            ("nic-cluster-policy-validation", "lenient"),
        ],
    );
    assert_eq!(validator(Deployment::NetworkOperator).evaluate(&lenient), None);

    let complete = options(
        Deployment::NetworkOperator,
        &[("nic-cluster-policy", STRICT_POLICY)],
    );
    assert_eq!(validator(Deployment::NetworkOperator).evaluate(&complete), None);
}

#[test]
fn test_policy_kind_must_match() {
    let raw = options(
        Deployment::NetworkOperator,
        &[
            ("nic-cluster-policy", "kind: HostDeviceNetwork"),
            ("nic-cluster-policy-validation", "lenient"),
        ],
    );
    assert_eq!(
        validator(Deployment::NetworkOperator).evaluate(&raw),
        Some("nic-cluster-policy is invalid".to_string())
    );
}

#[test]
fn test_unknown_strictness_is_rejected() {
    let raw = options(
        Deployment::NetworkOperator,
        &[
            ("nic-cluster-policy", STRICT_POLICY),
            ("nic-cluster-policy-validation", "paranoid"),
        ],
    );
    assert_eq!(
        validator(Deployment::NetworkOperator).evaluate(&raw),
        Some("nic-cluster-policy-validation is invalid".to_string())
    );
    assert!(policy_strictness(&raw).is_err());

    let unset = options(Deployment::NetworkOperator, &[("nic-cluster-policy-validation", "")]);
    assert_eq!(policy_strictness(&unset), Ok(PolicyStrictness::Strict));
}

#[test]
fn test_structured_policy_is_validated() {
    let mut raw = options(Deployment::NetworkOperator, &[]);
    raw.insert(
        "nic-cluster-policy".to_string(),
        serde_yaml::from_str("kind: Foo\nspec: {}").unwrap(),
    );
    assert_eq!(
        validator(Deployment::NetworkOperator).evaluate(&raw),
        Some("nic-cluster-policy is invalid".to_string())
    );

    raw.insert(
        "nic-cluster-policy".to_string(),
        serde_yaml::from_str(STRICT_POLICY).unwrap(),
    );
    assert_eq!(validator(Deployment::NetworkOperator).evaluate(&raw), None);
}

#[test]
fn test_worker_conf_is_checked_before_policy() {
    let raw = options(
        Deployment::NetworkOperator,
        &[("nfd-worker-conf", "foo: bar"), ("nic-cluster-policy", "foo: '")],
    );
    assert_eq!(
        validator(Deployment::NetworkOperator).evaluate(&raw),
        Some("nfd-worker-conf is invalid".to_string())
    );
}

#[test]
fn test_gpu_ignores_policy_option() {
    let raw = options(
        Deployment::GpuOperator,
        &[("nic-cluster-policy", "foo: '")],
    );
    assert_eq!(validator(Deployment::GpuOperator).evaluate(&raw), None);
}

#[test]
fn test_available_data_parses_and_drops_empty() {
    let raw = options(
        Deployment::GpuOperator,
        &[("nfd-worker-conf", "sources: {pci: {}}"), ("image-registry", "")],
    );
    let data = validator(Deployment::GpuOperator).available_data(&raw);

    let nfd = data.get("nfd-worker-conf").unwrap();
    assert!(nfd.is_mapping());
    assert!(nfd["sources"]["pci"].is_mapping());
    assert!(data.get("image-registry").is_none());
    assert!(data.get("namespace").is_none());
    assert!(data.get("release").is_none());
}

#[test]
fn test_available_data_passes_scalars_through() {
    let mut raw = RawConfig::new();
    raw.insert("image-registry".to_string(), "rocks.example.com".into());
    raw.insert("nfd-worker-conf".to_string(), "sources: {}".into());
    raw.insert("extra".to_string(), serde_yaml::Value::Null);

    let data = validator(Deployment::GpuOperator).available_data(&raw);
    assert_eq!(
        data.get("image-registry").and_then(serde_yaml::Value::as_str),
        Some("rocks.example.com")
    );
    assert!(data.get("extra").is_none());
}

#[test]
fn test_configured_namespace_defaults() {
    assert_eq!(configured_namespace(&RawConfig::new()), "default");
    let raw = options(Deployment::GpuOperator, &[("namespace", "")]);
    assert_eq!(configured_namespace(&raw), "default");
    let raw = options(Deployment::GpuOperator, &[("namespace", "gpu")]);
    assert_eq!(configured_namespace(&raw), "gpu");
}
