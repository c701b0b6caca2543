//! # Hash Command
//!
//! Prints the configuration hash the reconciler would compare against.

use anyhow::{bail, Result};
use nvidia_operator_controller::config::ControllerConfig;
use nvidia_operator_controller::controller::manifests::{ConfigHash, ManifestSet};
use nvidia_operator_controller::controller::reconciler::validation::{
    configured_namespace, ConfigValidator, RawConfig,
};
use nvidia_operator_controller::Deployment;

pub fn hash_command(
    config: &ControllerConfig,
    deployment: Deployment,
    raw: &RawConfig,
) -> Result<ConfigHash> {
    let validator = ConfigValidator::new(deployment.governed_fields());
    if let Some(reason) = validator.evaluate(raw) {
        bail!("Invalid options: {reason}");
    }

    let manifests = ManifestSet::load(deployment, &config.manifests_dir, &config.app_name)?;
    let effective = manifests.config(&validator.available_data(raw), &configured_namespace(raw));
    let hash = manifests.hash(&effective);
    println!("{hash}");
    Ok(hash)
}
