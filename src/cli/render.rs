//! # Render Command
//!
//! Prints the manifests a deployment would apply, as multi-document YAML.

use anyhow::{bail, Result};
use nvidia_operator_controller::config::ControllerConfig;
use nvidia_operator_controller::controller::manifests::{Evaluation, ManifestSet};
use nvidia_operator_controller::controller::reconciler::validation::{
    configured_namespace, ConfigValidator, RawConfig,
};
use nvidia_operator_controller::Deployment;
use tracing::warn;

pub fn render_command(
    config: &ControllerConfig,
    deployment: Deployment,
    raw: &RawConfig,
    namespace: Option<String>,
) -> Result<()> {
    let validator = ConfigValidator::new(deployment.governed_fields());
    if let Some(reason) = validator.evaluate(raw) {
        bail!("Invalid options: {reason}");
    }

    let manifests = ManifestSet::load(deployment, &config.manifests_dir, &config.app_name)?;
    let namespace = namespace.unwrap_or_else(|| configured_namespace(raw));
    let effective = manifests.config(&validator.available_data(raw), &namespace);
    match manifests.evaluate(&effective) {
        Some(Evaluation::Blocked(reason)) => bail!("{reason}"),
        Some(Evaluation::Waiting(reason)) => warn!("{}", reason),
        None => {}
    }

    let mut documents = Vec::new();
    for resource in manifests.render(&effective)? {
        documents.push(resource.to_yaml()?);
    }
    print!("{}", documents.join("---\n"));
    Ok(())
}
