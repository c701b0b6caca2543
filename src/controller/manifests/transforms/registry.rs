//! Container image registry rewrite.

use super::{skip, ManifestTransform, RenderContext};
use crate::controller::manifests::resource::ManifestResource;

const CONTAINER_KEYS: [&str; 2] = ["initContainers", "containers"];

/// Rewrites container images of workload resources onto the `image-registry` prefix
///
/// `nvcr.io/nvidia/gpu-operator:v24.9.2` with registry `rocks.example.com/cdk`
/// becomes `rocks.example.com/cdk/nvidia/gpu-operator:v24.9.2`. No-op while the
/// option is unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryRewriter;

impl RegistryRewriter {
    const NAME: &'static str = "registry-rewriter";
}

impl ManifestTransform for RegistryRewriter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, resource: ManifestResource, ctx: &RenderContext<'_>) -> ManifestResource {
        let Some(registry) = ctx.config.image_registry() else {
            return resource;
        };
        let Some(path) = pod_spec_path(resource.kind()) else {
            return resource;
        };

        let mut rewritten = resource.clone();
        match rewrite_pod_spec(rewritten.body_mut(), path, registry) {
            Ok(()) => rewritten,
            Err(reason) => {
                skip(Self::NAME, &resource, &reason);
                resource
            }
        }
    }
}

fn rewrite_pod_spec(
    body: &mut serde_json::Value,
    path: &[&str],
    registry: &str,
) -> Result<(), String> {
    let mut pod_spec = body;
    for key in path {
        pod_spec = pod_spec
            .get_mut(*key)
            .ok_or_else(|| format!("pod template has no {key}"))?;
    }
    if !pod_spec.is_object() {
        return Err("pod spec is not an object".to_string());
    }

    for key in CONTAINER_KEYS {
        let Some(containers) = pod_spec.get_mut(key) else {
            continue;
        };
        let containers = containers
            .as_array_mut()
            .ok_or_else(|| format!("{key} is not a list"))?;
        for container in containers {
            match container.get_mut("image") {
                Some(serde_json::Value::String(image)) => {
                    *image = rewrite_image(registry, image);
                }
                _ => return Err(format!("{key} entry has no image")),
            }
        }
    }
    Ok(())
}

/// Location of the pod spec inside each workload kind
fn pod_spec_path(kind: &str) -> Option<&'static [&'static str]> {
    match kind {
        "Pod" => Some(&["spec"]),
        "Deployment" | "DaemonSet" | "StatefulSet" | "ReplicaSet" | "Job" => {
            Some(&["spec", "template", "spec"])
        }
        "CronJob" => Some(&["spec", "jobTemplate", "spec", "template", "spec"]),
        _ => None,
    }
}

/// Replace the registry component of an image reference
///
/// The first path segment is a registry host when it contains `.` or `:` or is
/// `localhost`; otherwise the whole reference is a repository path on the
/// default registry.
pub fn rewrite_image(registry: &str, image: &str) -> String {
    let path = match image.split_once('/') {
        Some((first, rest))
            if first.contains('.') || first.contains(':') || first == "localhost" =>
        {
            rest
        }
        _ => image,
    };
    format!("{}/{}", registry.trim_end_matches('/'), path)
}
