//! # Reconcile Command
//!
//! Handles a single trigger against the live cluster. State is read from and
//! written back to a JSON file between invocations.

use anyhow::{Context, Result};
use kube::Client;
use nvidia_operator_controller::config::ControllerConfig;
use nvidia_operator_controller::controller::reconciler::validation::RawConfig;
use nvidia_operator_controller::provider::KubeClusterClient;
use nvidia_operator_controller::runtime::LocalScheduler;
use nvidia_operator_controller::{ControllerState, Deployment, Reconciler, Trigger};
use std::path::Path;
use tracing::info;

/// Returns whether the trigger was deferred
pub async fn reconcile_command(
    config: &ControllerConfig,
    deployment: Deployment,
    trigger: Trigger,
    raw: &RawConfig,
    state_path: &Path,
) -> Result<bool> {
    let mut state = read_state(state_path, raw)?;

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client. Ensure kubeconfig is configured.")?;
    let reconciler = Reconciler::load(
        deployment,
        config,
        KubeClusterClient::new(client, config.field_manager.as_str()),
    )
    .context("Failed to load manifests")?;

    let mut scheduler = LocalScheduler::new();
    reconciler
        .handle(trigger, raw, &mut state, &mut scheduler)
        .await
        .with_context(|| format!("Failed to handle {trigger}"))?;

    write_state(state_path, &state)?;

    if let Some(status) = scheduler.unit_status() {
        println!("{}: {}", status.name(), status);
    }
    Ok(scheduler.is_deferred())
}

fn read_state(path: &Path, raw: &RawConfig) -> Result<ControllerState> {
    if !path.exists() {
        info!("No state at {}, starting fresh", path.display());
        return Ok(ControllerState::initial(raw));
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse state file {}", path.display()))
}

fn write_state(path: &Path, state: &ControllerState) -> Result<()> {
    let content = serde_json::to_string_pretty(state).context("Failed to serialize state")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write state file {}", path.display()))
}
