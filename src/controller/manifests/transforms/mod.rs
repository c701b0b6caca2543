//! # Manifest Transforms
//!
//! Pure functions applied, in a fixed order, to every cloned template of a
//! manifest set at render time. A transform whose target predicate does not
//! match a resource hands it back untouched. A transform that finds malformed
//! data on its own target logs a warning and returns the resource unmodified;
//! it never fails the render.

mod config_map;
mod labels;
mod namespace;
mod registry;

pub use config_map::ConfigMapDataInjector;
pub use labels::LabelInjector;
pub use namespace::{is_cluster_scoped, NamespaceRewriter};
pub use registry::{rewrite_image, RegistryRewriter};

use crate::controller::manifests::resource::ManifestResource;
use crate::controller::reconciler::validation::EffectiveConfig;
use crate::observability::metrics;
use std::fmt;
use tracing::warn;

/// Inputs shared by every transform during one render
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub config: &'a EffectiveConfig,
    /// Manifest set name (`gpu-operator`, `network-operator`)
    pub manifest: &'a str,
    /// Release being rendered
    pub release: &'a str,
    /// Owning application, written into the ownership label
    pub app_name: &'a str,
}

pub trait ManifestTransform: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Takes ownership of a cloned resource and returns it, transformed or not
    fn apply(&self, resource: ManifestResource, ctx: &RenderContext<'_>) -> ManifestResource;
}

/// Run every transform over a resource in declared order
pub fn run_chain(
    transforms: &[Box<dyn ManifestTransform>],
    resource: ManifestResource,
    ctx: &RenderContext<'_>,
) -> ManifestResource {
    transforms
        .iter()
        .fold(resource, |resource, transform| transform.apply(resource, ctx))
}

/// Record a skipped resource for a transform
pub(crate) fn skip(transform: &'static str, resource: &ManifestResource, reason: &str) {
    warn!(
        "{} skipped {}: {}",
        transform,
        resource.identity(),
        reason
    );
    metrics::increment_transform_skips(transform);
}
