//! # CLI Commands
//!
//! Subcommands of the controller binary. Each runs once and exits; the
//! lifecycle manager invoking `reconcile` owns scheduling and retries.

pub mod hash;
pub mod reconcile;
pub mod render;

use anyhow::{Context, Result};
use nvidia_operator_controller::controller::reconciler::validation::RawConfig;
use nvidia_operator_controller::Deployment;
use std::path::Path;

/// Deployment defaults overlaid with the options file, if any
pub fn load_options(deployment: Deployment, path: Option<&Path>) -> Result<RawConfig> {
    let mut options = deployment.default_options();
    if let Some(path) = path {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file {}", path.display()))?;
        let overrides: Option<RawConfig> = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse options file {}", path.display()))?;
        options.extend(overrides.unwrap_or_default());
    }
    Ok(options)
}
