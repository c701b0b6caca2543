//! # Lifecycle Scheduler
//!
//! The reconciler never retries on its own. When a trigger cannot complete it
//! asks the scheduler to deliver it again later, and leaves the state as it
//! found it.

use crate::controller::reconciler::status::Status;
use crate::controller::reconciler::Trigger;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

pub trait LifecycleScheduler: Send {
    /// Re-queue the trigger currently being handled
    fn defer(&mut self, trigger: Trigger);

    fn set_unit_status(&mut self, status: Status);

    fn set_app_status(&mut self, status: Status);

    fn set_workload_version(&mut self, version: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    pub status: Status,
    pub at: DateTime<Utc>,
}

/// In-process scheduler used by the CLI for a single trigger
///
/// Keeps every status it was given, in order, and whether a deferral was
/// requested. The caller decides what a deferral means (the CLI exits with
/// `EX_TEMPFAIL`).
#[derive(Debug, Default)]
pub struct LocalScheduler {
    unit_statuses: Vec<StatusRecord>,
    app_statuses: Vec<StatusRecord>,
    deferred: Vec<Trigger>,
    workload_version: Option<String>,
}

impl LocalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deferred(&self) -> &[Trigger] {
        &self.deferred
    }

    pub fn is_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    pub fn unit_statuses(&self) -> impl Iterator<Item = &Status> {
        self.unit_statuses.iter().map(|record| &record.status)
    }

    pub fn unit_status(&self) -> Option<&Status> {
        self.unit_statuses.last().map(|record| &record.status)
    }

    pub fn app_status(&self) -> Option<&Status> {
        self.app_statuses.last().map(|record| &record.status)
    }

    pub fn workload_version(&self) -> Option<&str> {
        self.workload_version.as_deref()
    }

    pub fn history(&self) -> &[StatusRecord] {
        &self.unit_statuses
    }
}

impl LifecycleScheduler for LocalScheduler {
    fn defer(&mut self, trigger: Trigger) {
        warn!("Deferring {} for a later retry", trigger);
        self.deferred.push(trigger);
    }

    fn set_unit_status(&mut self, status: Status) {
        info!("Unit status: {} ({})", status.name(), status);
        self.unit_statuses.push(StatusRecord {
            status,
            at: Utc::now(),
        });
    }

    fn set_app_status(&mut self, status: Status) {
        info!("Application status: {} ({})", status.name(), status);
        self.app_statuses.push(StatusRecord {
            status,
            at: Utc::now(),
        });
    }

    fn set_workload_version(&mut self, version: &str) {
        info!("Workload version: {}", version);
        self.workload_version = Some(version.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_latest_status() {
        let mut scheduler = LocalScheduler::new();
        scheduler.set_unit_status(Status::Maintenance("Evaluating Manifests".to_string()));
        scheduler.set_unit_status(Status::Active("Ready".to_string()));

        assert_eq!(scheduler.history().len(), 2);
        assert_eq!(
            scheduler.unit_status(),
            Some(&Status::Active("Ready".to_string()))
        );
        assert!(!scheduler.is_deferred());
    }

    #[test]
    fn test_records_deferral() {
        let mut scheduler = LocalScheduler::new();
        scheduler.defer(Trigger::ConfigChanged);
        assert!(scheduler.is_deferred());
        assert_eq!(scheduler.deferred(), &[Trigger::ConfigChanged]);
    }
}
