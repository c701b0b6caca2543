//! Ownership labels.

use super::{ManifestTransform, RenderContext};
use crate::constants::{LABEL_MANAGED_BY, LABEL_MANIFEST, LABEL_MANIFEST_VERSION};
use crate::controller::manifests::resource::ManifestResource;

/// Adds the ownership and manifest labels to every resource
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelInjector;

impl ManifestTransform for LabelInjector {
    fn name(&self) -> &'static str {
        "label-injector"
    }

    fn apply(&self, mut resource: ManifestResource, ctx: &RenderContext<'_>) -> ManifestResource {
        let labels = resource.labels_mut();
        labels.insert(LABEL_MANAGED_BY.to_string(), ctx.app_name.to_string());
        labels.insert(LABEL_MANIFEST.to_string(), ctx.manifest.to_string());
        labels.insert(
            LABEL_MANIFEST_VERSION.to_string(),
            format!("{}-{}", ctx.manifest, ctx.release),
        );
        resource
    }
}
