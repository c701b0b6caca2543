//! Namespace rewrite.

use super::{skip, ManifestTransform, RenderContext};
use crate::controller::manifests::resource::ManifestResource;

/// Kinds that never carry `metadata.namespace`
const CLUSTER_SCOPED_KINDS: &[&str] = &[
    "APIService",
    "ClusterPolicy",
    "ClusterRole",
    "ClusterRoleBinding",
    "CustomResourceDefinition",
    "MutatingWebhookConfiguration",
    "Namespace",
    "NicClusterPolicy",
    "NodeFeatureRule",
    "PersistentVolume",
    "PriorityClass",
    "RuntimeClass",
    "StorageClass",
    "ValidatingWebhookConfiguration",
];

pub fn is_cluster_scoped(kind: &str) -> bool {
    CLUSTER_SCOPED_KINDS.contains(&kind)
}

/// Moves namespace-scoped resources into the effective namespace
///
/// Role bindings additionally have every `ServiceAccount` subject pointed at
/// the effective namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceRewriter;

impl NamespaceRewriter {
    const NAME: &'static str = "namespace-rewriter";
}

impl ManifestTransform for NamespaceRewriter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, mut resource: ManifestResource, ctx: &RenderContext<'_>) -> ManifestResource {
        let namespace = ctx.config.namespace();

        if matches!(resource.kind(), "RoleBinding" | "ClusterRoleBinding") {
            let subjects_ok = resource
                .body()
                .get("subjects")
                .is_none_or(|subjects| subjects.is_null() || subjects.is_array());
            if subjects_ok {
                rewrite_subjects(resource.body_mut(), namespace);
            } else {
                skip(Self::NAME, &resource, "subjects is not a list");
            }
        }

        if !is_cluster_scoped(resource.kind()) {
            resource.metadata_mut().namespace = Some(namespace.to_string());
        }
        resource
    }
}

fn rewrite_subjects(body: &mut serde_json::Value, namespace: &str) {
    let Some(subjects) = body.get_mut("subjects").and_then(|s| s.as_array_mut()) else {
        return;
    };
    for subject in subjects {
        let Some(subject) = subject.as_object_mut() else {
            continue;
        };
        if subject.get("kind").and_then(|k| k.as_str()) == Some("ServiceAccount") {
            subject.insert(
                "namespace".to_string(),
                serde_json::Value::String(namespace.to_string()),
            );
        }
    }
}
