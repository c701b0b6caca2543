//! # Status Report
//!
//! Projection of controller state and cluster readiness onto the unit and
//! application status.

use crate::constants::STATUS_READY;
use crate::controller::reconciler::state::ControllerState;
use crate::controller::reconciler::status::Status;
use crate::runtime::LifecycleScheduler;

/// Deployed releases, `short` as the workload version and `long` for display
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionInfo {
    pub short: String,
    pub long: String,
}

impl VersionInfo {
    /// Build from `(manifest name, release)` pairs
    pub fn from_releases<'a>(releases: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let releases: Vec<(&str, &str)> = releases.into_iter().collect();
        let short = releases
            .iter()
            .map(|(_, release)| *release)
            .collect::<Vec<_>>()
            .join(",");
        let long = releases
            .iter()
            .map(|(name, release)| format!("{name}={release}"))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            short,
            long: format!("Versions: {long}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub unit: Status,
    pub app: Option<Status>,
    pub workload_version: Option<String>,
}

impl StatusReport {
    pub fn publish(&self, scheduler: &mut dyn LifecycleScheduler) {
        scheduler.set_unit_status(self.unit.clone());
        if let Some(app) = &self.app {
            scheduler.set_app_status(app.clone());
        }
        if let Some(version) = &self.workload_version {
            scheduler.set_workload_version(version);
        }
    }
}

/// Derive the status after a readiness probe
///
/// Returns `None` when nothing was ever deployed. Unready resources take
/// priority over a namespace mismatch.
pub fn derive(
    state: &ControllerState,
    unready: &[String],
    configured_namespace: &str,
    versions: &VersionInfo,
) -> Option<StatusReport> {
    if !state.deployed {
        return None;
    }

    if !unready.is_empty() {
        return Some(StatusReport {
            unit: Status::Waiting(unready.to_vec()),
            app: None,
            workload_version: None,
        });
    }

    if state.namespace != configured_namespace {
        return Some(StatusReport {
            unit: Status::Blocked(format!(
                "Namespace '{}' cannot be configured to '{}'",
                state.namespace, configured_namespace
            )),
            app: None,
            workload_version: None,
        });
    }

    Some(StatusReport {
        unit: Status::Active(STATUS_READY.to_string()),
        app: Some(Status::Active(versions.long.clone())),
        workload_version: Some(versions.short.clone()),
    })
}
