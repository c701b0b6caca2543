//! # Reconciliation Logic
//!
//! One handler per trigger. Each runs to completion; a transient cluster
//! failure defers the trigger and returns with the applied hash untouched, so
//! the redelivered trigger repeats the same work. A changed configuration
//! clears `deployed` before it is applied.
//!
//! ## Trigger Flow
//!
//! 1. `config-changed`: validate, evaluate each manifest set, compare the
//!    configuration hash, and install when it changed
//! 2. `install` / `upgrade`: re-apply the last evaluated configuration
//! 3. `update-status`: probe readiness and derive the status
//! 4. `stop`: delete everything that was ever applied

use crate::constants::{
    STATUS_EVALUATING_CONFIG, STATUS_EVALUATING_MANIFESTS, STATUS_SHUTTING_DOWN, STATUS_UPDATING,
    STATUS_WAITING_FOR_APISERVER,
};
use crate::controller::manifests::{ConfigHash, Evaluation};
use crate::controller::reconciler::state::ControllerState;
use crate::controller::reconciler::status::{self, Status, VersionInfo};
use crate::controller::reconciler::types::{Reconciler, ReconcilerError, Trigger};
use crate::controller::reconciler::validation::{configured_namespace, EffectiveConfig, RawConfig};
use crate::observability::metrics;
use crate::provider::{ClusterClient, ClusterError};
use crate::runtime::LifecycleScheduler;
use tracing::{debug, info, warn, Instrument};

impl<C: ClusterClient> Reconciler<C> {
    /// Handle one trigger from the lifecycle manager
    pub async fn handle(
        &self,
        trigger: Trigger,
        raw: &RawConfig,
        state: &mut ControllerState,
        scheduler: &mut dyn LifecycleScheduler,
    ) -> Result<(), ReconcilerError> {
        let span = tracing::info_span!(
            "reconcile",
            deployment = self.deployment.manifest_name(),
            trigger = trigger.as_str()
        );

        async move {
            info!("🔄 Handling {} for {}", trigger, self.deployment.display_name());
            metrics::increment_triggers(trigger.as_str());

            match trigger {
                Trigger::ConfigChanged => self.merge_config(trigger, raw, state, scheduler).await,
                Trigger::Install | Trigger::Upgrade => {
                    if self
                        .install_or_upgrade(trigger, None, raw, state, scheduler)
                        .await?
                    {
                        self.update_status(raw, state, scheduler).await?;
                    }
                    Ok(())
                }
                Trigger::UpdateStatus => self.update_status(raw, state, scheduler).await,
                Trigger::Stop => self.cleanup(trigger, raw, state, scheduler).await,
            }
        }
        .instrument(span)
        .await
    }

    /// Effective configuration per manifest set, rendered into the deployed namespace
    pub fn effective_configs(&self, raw: &RawConfig, namespace: &str) -> Vec<EffectiveConfig> {
        let available = self.validator.available_data(raw);
        self.manifests
            .iter()
            .map(|manifests| manifests.config(&available, namespace))
            .collect()
    }

    /// Combined hash over every manifest set's configuration
    pub fn config_hash(&self, configs: &[EffectiveConfig]) -> ConfigHash {
        self.manifests
            .iter()
            .zip(configs)
            .fold(ConfigHash::ZERO, |hash, (manifests, config)| {
                hash.combine(manifests.hash(config))
            })
    }

    /// Releases that would be deployed with the given configuration
    pub fn versions(&self, configs: &[EffectiveConfig]) -> VersionInfo {
        VersionInfo::from_releases(
            self.manifests
                .iter()
                .zip(configs)
                .map(|(manifests, config)| (manifests.name(), manifests.version(config))),
        )
    }

    async fn merge_config(
        &self,
        trigger: Trigger,
        raw: &RawConfig,
        state: &mut ControllerState,
        scheduler: &mut dyn LifecycleScheduler,
    ) -> Result<(), ReconcilerError> {
        scheduler.set_unit_status(Status::Maintenance(STATUS_EVALUATING_CONFIG.to_string()));
        if let Some(reason) = self.validator.evaluate(raw) {
            warn!("Configuration rejected: {}", reason);
            scheduler.set_unit_status(Status::Blocked(reason));
            return Ok(());
        }

        scheduler.set_unit_status(Status::Maintenance(STATUS_EVALUATING_MANIFESTS.to_string()));
        let configs = self.effective_configs(raw, &state.namespace);
        for (manifests, config) in self.manifests.iter().zip(&configs) {
            match manifests.evaluate(config) {
                None => {}
                Some(Evaluation::Blocked(reason)) => {
                    warn!("{} cannot be applied: {}", manifests.name(), reason);
                    scheduler.set_unit_status(Status::Blocked(reason));
                    return Ok(());
                }
                Some(Evaluation::Waiting(reason)) => {
                    info!("{} is not ready to apply: {}", manifests.name(), reason);
                    scheduler.set_unit_status(Status::waiting(reason));
                    return Ok(());
                }
            }
        }

        let new_hash = self.config_hash(&configs);
        if state.last_applied_hash == Some(new_hash) {
            debug!("Configuration hash {} unchanged, nothing to apply", new_hash);
            return self.update_status(raw, state, scheduler).await;
        }

        info!("Configuration hash changed to {}", new_hash);
        state.deployed = false;
        if self
            .install_or_upgrade(trigger, Some(new_hash), raw, state, scheduler)
            .await?
        {
            self.update_status(raw, state, scheduler).await?;
        }
        Ok(())
    }

    /// Apply every manifest set
    ///
    /// `target` is the hash being installed, `None` to re-apply whatever was
    /// evaluated last. Returns whether anything was applied.
    async fn install_or_upgrade(
        &self,
        trigger: Trigger,
        target: Option<ConfigHash>,
        raw: &RawConfig,
        state: &mut ControllerState,
        scheduler: &mut dyn LifecycleScheduler,
    ) -> Result<bool, ReconcilerError> {
        if target == state.last_applied_hash {
            info!("Skipping until the config is evaluated.");
            return Ok(false);
        }

        if let Some(reason) = self.validator.evaluate(raw) {
            warn!("Configuration rejected: {}", reason);
            scheduler.set_unit_status(Status::Blocked(reason));
            return Ok(false);
        }

        scheduler.set_unit_status(Status::Maintenance(format!(
            "Deploying {}",
            self.deployment.display_name()
        )));
        scheduler.set_workload_version("");
        let configs = self.effective_configs(raw, &state.namespace);
        for (manifests, config) in self.manifests.iter().zip(&configs) {
            match manifests.apply_manifests(&self.client, config).await {
                Ok(_) => {}
                Err(e) if e.is_transient() => {
                    warn!("Failed to apply {}: {}", manifests.name(), e);
                    self.defer(trigger, scheduler);
                    return Ok(false);
                }
                Err(e) => return Err(e.into()),
            }
        }

        if target.is_some() {
            state.last_applied_hash = target;
        }
        state.deployed = true;
        info!("✅ {} deployed", self.deployment.display_name());
        Ok(true)
    }

    async fn update_status(
        &self,
        raw: &RawConfig,
        state: &ControllerState,
        scheduler: &mut dyn LifecycleScheduler,
    ) -> Result<(), ReconcilerError> {
        if !state.deployed {
            debug!("Nothing deployed yet, status unchanged");
            return Ok(());
        }

        scheduler.set_unit_status(Status::Maintenance(STATUS_UPDATING.to_string()));
        let mut unready = Vec::new();
        for manifests in &self.manifests {
            match manifests.unready(&self.client).await {
                Ok(mut reasons) => unready.append(&mut reasons),
                Err(ClusterError::Transient(message)) => {
                    warn!("Readiness probe for {} failed: {}", manifests.name(), message);
                    scheduler.set_unit_status(Status::waiting(STATUS_WAITING_FOR_APISERVER));
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }
        }
        unready.sort();

        let configs = self.effective_configs(raw, &state.namespace);
        let versions = self.versions(&configs);
        if let Some(report) = status::derive(state, &unready, &configured_namespace(raw), &versions)
        {
            report.publish(scheduler);
        }
        Ok(())
    }

    async fn cleanup(
        &self,
        trigger: Trigger,
        raw: &RawConfig,
        state: &mut ControllerState,
        scheduler: &mut dyn LifecycleScheduler,
    ) -> Result<(), ReconcilerError> {
        if state.last_applied_hash.is_some() {
            scheduler.set_unit_status(Status::Maintenance(format!(
                "Cleaning up {}",
                self.deployment.display_name()
            )));
            let configs = self.effective_configs(raw, &state.namespace);
            for (manifests, config) in self.manifests.iter().zip(&configs) {
                match manifests.delete_manifests(&self.client, config, true).await {
                    Ok(_) => {}
                    Err(e) if e.is_transient() => {
                        warn!("Failed to delete {}: {}", manifests.name(), e);
                        self.defer(trigger, scheduler);
                        return Ok(());
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            state.last_applied_hash = None;
            state.deployed = false;
        }

        scheduler.set_unit_status(Status::Maintenance(STATUS_SHUTTING_DOWN.to_string()));
        Ok(())
    }

    fn defer(&self, trigger: Trigger, scheduler: &mut dyn LifecycleScheduler) {
        scheduler.set_unit_status(Status::waiting(STATUS_WAITING_FOR_APISERVER));
        scheduler.defer(trigger);
        metrics::increment_deferrals(trigger.as_str());
    }
}
