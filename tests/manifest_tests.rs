//! # Manifest Tests
//!
//! Loading, rendering, hashing, and cluster operations of manifest sets.

mod common;

use common::{manifest_set, options, unready, FakeClusterClient, APP_NAME, STRICT_POLICY};
use nvidia_operator_controller::controller::manifests::{
    Evaluation, ManifestError, ManifestResource, ManifestSet,
};
use nvidia_operator_controller::controller::reconciler::validation::{
    ConfigValidator, EffectiveConfig, RawConfig,
};
use nvidia_operator_controller::provider::ClusterError;
use nvidia_operator_controller::Deployment;
use std::fs;
use std::path::Path;

fn effective(deployment: Deployment, raw: &RawConfig, namespace: &str) -> EffectiveConfig {
    let validator = ConfigValidator::new(deployment.governed_fields());
    assert_eq!(validator.evaluate(raw), None);
    EffectiveConfig::merge(validator.available_data(raw), namespace)
}

#[test]
fn test_shipped_releases_load() {
    let gpu = manifest_set(Deployment::GpuOperator);
    assert_eq!(gpu.name(), "gpu-operator");
    assert_eq!(gpu.releases().collect::<Vec<_>>(), vec!["v24.9.2"]);

    let network = manifest_set(Deployment::NetworkOperator);
    assert_eq!(network.releases().collect::<Vec<_>>(), vec!["v24.7.0"]);
}

#[test]
fn test_render_labels_every_resource() {
    let manifests = manifest_set(Deployment::GpuOperator);
    let config = effective(
        Deployment::GpuOperator,
        &options(Deployment::GpuOperator, &[]),
        "default",
    );

    for resource in manifests.render(&config).unwrap() {
        let labels = resource.metadata().labels.clone().unwrap_or_default();
        assert_eq!(
            labels.get("app.kubernetes.io/managed-by").map(String::as_str),
            Some(APP_NAME),
            "{} missing ownership label",
            resource.identity()
        );
        assert_eq!(
            labels.get("nvidia.operator/manifest").map(String::as_str),
            Some("gpu-operator")
        );
        assert_eq!(
            labels.get("nvidia.operator/manifest-version").map(String::as_str),
            Some("gpu-operator-v24.9.2")
        );
    }
}

#[test]
fn test_render_rewrites_namespaces() {
    let manifests = manifest_set(Deployment::GpuOperator);
    let config = effective(
        Deployment::GpuOperator,
        &options(Deployment::GpuOperator, &[]),
        "gpu-system",
    );
    let rendered = manifests.render(&config).unwrap();

    for resource in &rendered {
        match resource.kind() {
            "CustomResourceDefinition" | "ClusterRole" | "ClusterRoleBinding" => {
                assert_eq!(resource.namespace(), None, "{}", resource.identity());
            }
            _ => assert_eq!(
                resource.namespace(),
                Some("gpu-system"),
                "{}",
                resource.identity()
            ),
        }
    }

    let binding = rendered
        .iter()
        .find(|r| r.kind() == "ClusterRoleBinding" && r.name() == "gpu-operator")
        .unwrap();
    assert_eq!(binding.body()["subjects"][0]["namespace"], "gpu-system");
}

#[test]
fn test_render_leaves_templates_untouched() {
    let manifests = manifest_set(Deployment::GpuOperator);
    let mirrored = effective(
        Deployment::GpuOperator,
        &options(
            Deployment::GpuOperator,
            &[("image-registry", "mirror.example.com")],
        ),
        "elsewhere",
    );
    let plain = effective(
        Deployment::GpuOperator,
        &options(Deployment::GpuOperator, &[]),
        "default",
    );

    let first = manifests.render(&mirrored).unwrap();
    let second = manifests.render(&plain).unwrap();

    let image = |rendered: &[ManifestResource]| {
        rendered
            .iter()
            .find(|r| r.kind() == "Deployment" && r.name() == "gpu-operator")
            .map(|r| r.body()["spec"]["template"]["spec"]["containers"][0]["image"].clone())
            .unwrap()
    };
    assert_eq!(image(&first), "mirror.example.com/nvidia/gpu-operator:v24.9.2");
    assert_eq!(image(&second), "nvcr.io/nvidia/gpu-operator:v24.9.2");
}

#[test]
fn test_hash_ignores_key_order() {
    let manifests = manifest_set(Deployment::GpuOperator);
    let a = effective(
        Deployment::GpuOperator,
        &options(
            Deployment::GpuOperator,
            &[("nfd-worker-conf", "sources: {pci: {a: 1, b: 2}, usb: {}}")],
        ),
        "default",
    );
    let b = effective(
        Deployment::GpuOperator,
        &options(
            Deployment::GpuOperator,
            &[("nfd-worker-conf", "sources:\n  usb: {}\n  pci:\n    b: 2\n    a: 1\n")],
        ),
        "default",
    );
    assert_eq!(manifests.hash(&a), manifests.hash(&b));

    let c = effective(
        Deployment::GpuOperator,
        &options(Deployment::GpuOperator, &[("nfd-worker-conf", "sources: {}")]),
        "default",
    );
    assert_ne!(manifests.hash(&a), manifests.hash(&c));
}

#[test]
fn test_empty_options_do_not_change_hash() {
    let manifests = manifest_set(Deployment::GpuOperator);
    let with_empty = effective(
        Deployment::GpuOperator,
        &options(Deployment::GpuOperator, &[("image-registry", "")]),
        "default",
    );
    let mut raw = options(Deployment::GpuOperator, &[]);
    raw.remove("image-registry");
    let without = effective(Deployment::GpuOperator, &raw, "default");

    assert_eq!(manifests.hash(&with_empty), manifests.hash(&without));
}

#[test]
fn test_network_evaluate_waits_for_policy() {
    let manifests = manifest_set(Deployment::NetworkOperator);
    let config = effective(
        Deployment::NetworkOperator,
        &options(Deployment::NetworkOperator, &[]),
        "default",
    );
    assert_eq!(
        manifests.evaluate(&config),
        Some(Evaluation::Waiting(
            "Waiting for nic-cluster-policy config".to_string()
        ))
    );

    let config = effective(
        Deployment::NetworkOperator,
        &options(
            Deployment::NetworkOperator,
            &[("nic-cluster-policy", STRICT_POLICY)],
        ),
        "default",
    );
    assert_eq!(manifests.evaluate(&config), None);
}

fn write_release(root: &Path, release: &str, image: &str) {
    let dir = root.join("gpu-operator").join("manifests").join(release);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("operator.yaml"),
        format!(
            "apiVersion: apps/v1
kind: Deployment
metadata:
  name: gpu-operator
spec:
  template:
    spec:
      containers:
        - name: gpu-operator
          image: {image}
"
        ),
    )
    .unwrap();
}

#[test]
fn test_release_selection() {
    let root = tempfile::tempdir().unwrap();
    write_release(root.path(), "v1.9.0", "nvcr.io/nvidia/gpu-operator:v1.9.0");
    write_release(root.path(), "v1.10.0", "nvcr.io/nvidia/gpu-operator:v1.10.0");

    let manifests = ManifestSet::load(Deployment::GpuOperator, root.path(), APP_NAME).unwrap();
    assert_eq!(
        manifests.releases().collect::<Vec<_>>(),
        vec!["v1.9.0", "v1.10.0"]
    );

    let newest = effective(
        Deployment::GpuOperator,
        &options(Deployment::GpuOperator, &[]),
        "default",
    );
    assert_eq!(manifests.version(&newest), "v1.10.0");

    let pinned = effective(
        Deployment::GpuOperator,
        &options(Deployment::GpuOperator, &[("release", "v1.9.0")]),
        "default",
    );
    let rendered = manifests.render(&pinned).unwrap();
    assert_eq!(
        rendered[0].body()["spec"]["template"]["spec"]["containers"][0]["image"],
        "nvcr.io/nvidia/gpu-operator:v1.9.0"
    );

    let unknown = effective(
        Deployment::GpuOperator,
        &options(Deployment::GpuOperator, &[("release", "v0.1.0")]),
        "default",
    );
    assert!(matches!(
        manifests.evaluate(&unknown),
        Some(Evaluation::Blocked(_))
    ));
    assert!(matches!(
        manifests.render(&unknown),
        Err(ManifestError::UnknownRelease { .. })
    ));
}

#[test]
fn test_missing_template_directory() {
    let root = tempfile::tempdir().unwrap();
    let result = ManifestSet::load(Deployment::GpuOperator, root.path(), APP_NAME);
    assert!(matches!(result, Err(ManifestError::Io { .. })));
}

#[test]
fn test_malformed_template_names_file() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("gpu-operator/manifests/v1.0.0");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("broken.yaml"), "kind: [").unwrap();

    let result = ManifestSet::load(Deployment::GpuOperator, root.path(), APP_NAME);
    match result {
        Err(ManifestError::Template { path, .. }) => assert!(path.ends_with("broken.yaml")),
        other => panic!("expected template error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_unauthorized_only_tolerated_when_asked() {
    let manifests = manifest_set(Deployment::GpuOperator);
    let config = effective(
        Deployment::GpuOperator,
        &options(Deployment::GpuOperator, &[]),
        "default",
    );
    let client = FakeClusterClient::default();
    client.fail_deletes(ClusterError::Unauthorized("forbidden".to_string()));

    let tolerated = manifests.delete_manifests(&client, &config, true).await;
    assert_eq!(tolerated.unwrap(), 0);

    let strict = manifests.delete_manifests(&client, &config, false).await;
    assert!(matches!(
        strict,
        Err(ManifestError::Cluster(ClusterError::Unauthorized(_)))
    ));
}

#[tokio::test]
async fn test_delete_not_found_counts_as_deleted() {
    let manifests = manifest_set(Deployment::GpuOperator);
    let config = effective(
        Deployment::GpuOperator,
        &options(Deployment::GpuOperator, &[]),
        "default",
    );
    let client = FakeClusterClient::default();
    client.fail_deletes(ClusterError::NotFound("gone".to_string()));

    assert!(manifests.delete_manifests(&client, &config, false).await.is_ok());
}

#[tokio::test]
async fn test_delete_falls_back_to_newest_release() {
    let manifests = manifest_set(Deployment::GpuOperator);
    let config = effective(
        Deployment::GpuOperator,
        &options(Deployment::GpuOperator, &[("release", "v0.0.1")]),
        "default",
    );
    assert!(manifests.render(&config).is_err());

    let client = FakeClusterClient::default();
    let deleted = manifests.delete_manifests(&client, &config, false).await.unwrap();
    let newest = effective(
        Deployment::GpuOperator,
        &options(Deployment::GpuOperator, &[]),
        "default",
    );
    assert_eq!(deleted, manifests.render(&newest).unwrap().len());
}

#[tokio::test]
async fn test_apply_counts_resources() {
    let manifests = manifest_set(Deployment::GpuOperator);
    let config = effective(
        Deployment::GpuOperator,
        &options(Deployment::GpuOperator, &[]),
        "default",
    );
    let client = FakeClusterClient::default();

    let applied = manifests.apply_manifests(&client, &config).await.unwrap();
    assert_eq!(applied, client.applied_count());
    assert!(applied > 0);
}

#[tokio::test]
async fn test_unready_is_sorted() {
    let manifests = manifest_set(Deployment::GpuOperator);
    let client = FakeClusterClient::default();
    client.set_statuses(vec![
        unready("Deployment", "gpu-operator", None),
        unready("DaemonSet", "worker", None),
    ]);

    let reasons = manifests.unready(&client).await.unwrap();
    assert_eq!(
        reasons,
        vec![
            "DaemonSet/default/worker is not ready".to_string(),
            "Deployment/default/gpu-operator is not ready".to_string(),
        ]
    );
}
